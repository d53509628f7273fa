// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! In-memory lexicon implementing [`FieldAccessor`].
//!
//! Objects are records of named field values. The schema is inferred: a
//! field exists on a class once any object of that class has it set (or it
//! was declared with [`InMemoryLexicon::declare_field`]). Vernacular text is
//! written in `fr`, analysis text in `en`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use lexi_render::schema::{self, MappingKind};
use lexi_render::{
    FieldAccessor, FieldKind, FileRef, Guid, MultiString, ObjectId, ObjectKind, TsString, Value,
};

/// Class name of entries.
pub const ENTRY_CLASS: &str = "LexEntry";
/// Class name of senses.
pub const SENSE_CLASS: &str = "LexSense";
/// Field holding an object's lexical relations.
pub const LEX_REFERENCES: &str = "LexReferences";
/// Field on a main entry listing refs of its variants.
pub const VARIANT_BACK_REFS: &str = "VariantFormEntryBackRefs";
/// Field on a sense listing its pictures.
pub const PICTURES: &str = "Pictures";
/// Field on a picture holding its file.
pub const PICTURE_FILE: &str = "PictureFileRA";
/// Field on a variant or complex-form ref naming the entry that owns it.
pub const OWNING_ENTRY: &str = "OwningEntry";

const VERNACULAR_WS: &str = "fr";
const ANALYSIS_WS: &str = "en";

struct Record {
    class: String,
    kind: ObjectKind,
    guid: Guid,
    owner: Option<ObjectId>,
    sort_key: Option<String>,
    fields: HashMap<String, Value>,
}

/// In-memory lexicon.
#[derive(Default)]
pub struct InMemoryLexicon {
    records: Vec<Record>,
    schema: HashMap<String, HashMap<String, FieldKind>>,
    custom: HashMap<(String, String), HashMap<ObjectId, Value>>,
    schema_lookups: AtomicUsize,
}

fn kind_of(value: &Value) -> FieldKind {
    match value {
        Value::Object(_) | Value::Null => FieldKind::Atomic,
        Value::Sequence(_) => FieldKind::Sequence,
        Value::Collection(_) => FieldKind::Collection,
        Value::Rich(_) => FieldKind::Rich,
        Value::Multi(_) => FieldKind::MultiString,
        Value::Paragraphs(_) => FieldKind::Paragraphs,
        Value::File(_) => FieldKind::File,
        Value::String(_)
        | Value::Integer(_)
        | Value::Boolean(_)
        | Value::Date(_)
        | Value::GenDate(_) => FieldKind::Primitive,
    }
}

impl InMemoryLexicon {
    /// Empty lexicon.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `field_kind` calls served so far.
    pub fn schema_lookups(&self) -> usize {
        self.schema_lookups.load(Ordering::Relaxed)
    }

    fn record(&self, obj: ObjectId) -> Option<&Record> {
        usize::try_from(obj.0).ok().and_then(|i| self.records.get(i))
    }

    fn record_mut(&mut self, obj: ObjectId) -> &mut Record {
        let index = usize::try_from(obj.0).unwrap_or(usize::MAX);
        &mut self.records[index]
    }

    /// Adds a bare object.
    pub fn add_object(&mut self, class: &str, kind: ObjectKind) -> ObjectId {
        let id = ObjectId(self.records.len() as u64);
        self.records.push(Record {
            class: class.to_owned(),
            kind,
            guid: Guid::from_u128(0x1000_0000 + u128::from(id.0)),
            owner: None,
            sort_key: None,
            fields: HashMap::new(),
        });
        id
    }

    /// Makes `obj` owned by `owner`.
    pub fn set_owner(&mut self, obj: ObjectId, owner: ObjectId) {
        self.record_mut(obj).owner = Some(owner);
    }

    /// Overrides the generated GUID.
    pub fn set_guid(&mut self, obj: ObjectId, guid: Guid) {
        self.record_mut(obj).guid = guid;
    }

    /// Overrides the collection sort key (default: the headword).
    pub fn set_sort_key(&mut self, obj: ObjectId, key: &str) {
        self.record_mut(obj).sort_key = Some(key.to_owned());
    }

    /// Declares `field` on `class` without setting it anywhere.
    pub fn declare_field(&mut self, class: &str, field: &str, kind: FieldKind) {
        self.schema
            .entry(class.to_owned())
            .or_default()
            .insert(field.to_owned(), kind);
    }

    /// Sets a static field, declaring it on the object's class.
    pub fn set(&mut self, obj: ObjectId, field: &str, value: Value) {
        let class = self.record_mut(obj).class.clone();
        self.schema
            .entry(class)
            .or_default()
            .entry(field.to_owned())
            .or_insert_with(|| kind_of(&value));
        self.record_mut(obj).fields.insert(field.to_owned(), value);
    }

    /// Appends `item` to a sequence field.
    pub fn push(&mut self, obj: ObjectId, field: &str, item: ObjectId) {
        let mut items = match self.record(obj).and_then(|r| r.fields.get(field)) {
            Some(Value::Sequence(items)) => items.clone(),
            _ => Vec::new(),
        };
        items.push(item);
        self.set(obj, field, Value::Sequence(items));
    }

    /// Sets a custom field declared on `owner_class`.
    pub fn set_custom(&mut self, obj: ObjectId, owner_class: &str, field: &str, value: Value) {
        self.custom
            .entry((owner_class.to_owned(), field.to_owned()))
            .or_default()
            .insert(obj, value);
    }

    /// Entry with a vernacular headword and lexeme form.
    pub fn add_entry(&mut self, headword: &str) -> ObjectId {
        let entry = self.add_object(ENTRY_CLASS, ObjectKind::Entry);
        self.set(entry, "HeadWord", Value::Rich(TsString::plain(headword, VERNACULAR_WS)));
        self.set(
            entry,
            "LexemeForm",
            Value::Multi(MultiString::new().with(VERNACULAR_WS, headword)),
        );
        entry
    }

    /// Sense appended to `owner`'s senses (an entry, or a sense for a
    /// sub-sense), glossed in English. Its headword is its entry's.
    pub fn add_sense(&mut self, owner: ObjectId, gloss: &str) -> ObjectId {
        let sense = self.add_object(SENSE_CLASS, ObjectKind::Sense);
        self.set_owner(sense, owner);
        let headword = self.headword(owner);
        self.set(sense, "HeadWord", Value::Rich(headword));
        self.set(sense, "Gloss", Value::Multi(MultiString::new().with(ANALYSIS_WS, gloss)));
        self.push(owner, schema::SENSES, sense);
        sense
    }

    /// Grammatical info abbreviated `abbreviation` on `sense`.
    pub fn set_grammatical_info(&mut self, sense: ObjectId, abbreviation: &str) -> ObjectId {
        let msa = self.add_object("MoStemMsa", ObjectKind::Other);
        self.set_owner(msa, sense);
        self.set(
            msa,
            "InterlinearAbbr",
            Value::Multi(MultiString::new().with(ANALYSIS_WS, abbreviation)),
        );
        self.set(sense, schema::GRAMMATICAL_INFO, Value::Object(msa));
        msa
    }

    /// Possibility named `name` with an abbreviation.
    pub fn add_possibility(&mut self, class: &str, name: &str, abbreviation: &str) -> ObjectId {
        let item = self.add_object(class, ObjectKind::Possibility);
        self.set(item, "Name", Value::Multi(MultiString::new().with(ANALYSIS_WS, name)));
        self.set(
            item,
            "Abbreviation",
            Value::Multi(MultiString::new().with(ANALYSIS_WS, abbreviation)),
        );
        item
    }

    /// Variant or complex-form type.
    pub fn add_entry_type(&mut self, name: &str, abbreviation: &str) -> ObjectId {
        self.add_possibility("LexEntryType", name, abbreviation)
    }

    /// Lexical relation type; `reverse_name` applies to directed mappings.
    pub fn add_relation_type(
        &mut self,
        name: &str,
        reverse_name: Option<&str>,
        mapping: MappingKind,
    ) -> ObjectId {
        let ty = self.add_object("LexRefType", ObjectKind::RelationType);
        self.set(ty, "Name", Value::Multi(MultiString::new().with(ANALYSIS_WS, name)));
        self.set(ty, schema::MAPPING_TYPE, Value::Integer(mapping.code()));
        if let Some(reverse) = reverse_name {
            self.set(
                ty,
                &schema::reversed("Name"),
                Value::Multi(MultiString::new().with(ANALYSIS_WS, reverse)),
            );
        }
        ty
    }

    /// Lexical relation of type `ty` over `targets`, listed on every target.
    pub fn add_relation(&mut self, ty: ObjectId, targets: &[ObjectId]) -> ObjectId {
        let reference = self.add_object("LexReference", ObjectKind::LexReference);
        self.set(reference, schema::OWNER_TYPE, Value::Object(ty));
        self.set(reference, schema::TARGETS, Value::Sequence(targets.to_vec()));
        for &target in targets {
            self.push(target, LEX_REFERENCES, reference);
        }
        reference
    }

    /// Makes `form` a complex form of `components`; `primaries` own it as a
    /// subentry.
    pub fn add_complex_form(
        &mut self,
        form: ObjectId,
        components: &[ObjectId],
        primaries: &[ObjectId],
        types: &[ObjectId],
    ) -> ObjectId {
        let entry_ref = self.add_object("LexEntryRef", ObjectKind::EntryRef);
        self.set_owner(entry_ref, form);
        self.set(entry_ref, schema::REF_TYPE, Value::Integer(1));
        self.set(entry_ref, OWNING_ENTRY, Value::Object(form));
        self.set(entry_ref, schema::COMPLEX_ENTRY_TYPES, Value::Sequence(types.to_vec()));
        self.set(entry_ref, schema::COMPONENT_LEXEMES, Value::Sequence(components.to_vec()));
        self.set(entry_ref, schema::PRIMARY_LEXEMES, Value::Sequence(primaries.to_vec()));
        self.push(form, schema::ENTRY_REFS, entry_ref);
        self.push(form, schema::MAIN_ENTRY_REFS, entry_ref);
        for &primary in primaries {
            self.push(primary, schema::SUBENTRIES_PREFIX, form);
        }
        entry_ref
    }

    /// Makes `variant` a variant of `main`.
    pub fn add_variant(&mut self, variant: ObjectId, main: ObjectId, types: &[ObjectId]) -> ObjectId {
        let entry_ref = self.add_object("LexEntryRef", ObjectKind::EntryRef);
        self.set_owner(entry_ref, variant);
        self.set(entry_ref, schema::REF_TYPE, Value::Integer(0));
        self.set(entry_ref, OWNING_ENTRY, Value::Object(variant));
        self.set(entry_ref, schema::VARIANT_ENTRY_TYPES, Value::Sequence(types.to_vec()));
        self.set(entry_ref, schema::COMPONENT_LEXEMES, Value::Sequence(vec![main]));
        self.push(variant, schema::ENTRY_REFS, entry_ref);
        self.push(variant, schema::MAIN_ENTRY_REFS, entry_ref);
        self.push(main, VARIANT_BACK_REFS, entry_ref);
        entry_ref
    }

    /// Picture of `sense` stored at `path`.
    pub fn add_picture(&mut self, sense: ObjectId, path: &str) -> ObjectId {
        let picture = self.add_object("CmPicture", ObjectKind::Picture);
        self.set_owner(picture, sense);
        let file = self.add_object("CmFile", ObjectKind::Other);
        self.set(
            picture,
            PICTURE_FILE,
            Value::File(FileRef {
                id: file,
                path: path.to_owned(),
            }),
        );
        self.push(sense, PICTURES, picture);
        picture
    }
}

impl FieldAccessor for InMemoryLexicon {
    fn class_name(&self, obj: ObjectId) -> Option<&str> {
        self.record(obj).map(|r| r.class.as_str())
    }

    fn object_kind(&self, obj: ObjectId) -> ObjectKind {
        self.record(obj).map_or(ObjectKind::Other, |r| r.kind)
    }

    fn guid(&self, obj: ObjectId) -> Guid {
        self.record(obj).map(|r| r.guid).unwrap_or_default()
    }

    fn field_kind(&self, class: &str, field: &str) -> Option<FieldKind> {
        self.schema_lookups.fetch_add(1, Ordering::Relaxed);
        self.schema.get(class).and_then(|fields| fields.get(field)).copied()
    }

    fn get_field(&self, obj: ObjectId, field: &str) -> Option<Value> {
        let record = self.record(obj)?;
        let declared = self
            .schema
            .get(&record.class)
            .is_some_and(|fields| fields.contains_key(field));
        if !declared {
            return None;
        }
        Some(record.fields.get(field).cloned().unwrap_or_default())
    }

    fn get_custom_field(&self, obj: ObjectId, owner_class: &str, field: &str) -> Option<Value> {
        self.custom
            .get(&(owner_class.to_owned(), field.to_owned()))
            .map(|values| values.get(&obj).cloned().unwrap_or_default())
    }

    fn sort_key(&self, obj: ObjectId) -> String {
        match self.record(obj).and_then(|r| r.sort_key.clone()) {
            Some(key) => key,
            None => self.headword(obj).text(),
        }
    }

    fn headword(&self, obj: ObjectId) -> TsString {
        let Some(record) = self.record(obj) else {
            return TsString::default();
        };
        match record.fields.get("HeadWord") {
            Some(Value::Rich(text)) => text.clone(),
            _ => match (record.kind, self.owning_entry(obj)) {
                (ObjectKind::Sense, Some(entry)) => self.headword(entry),
                _ => TsString::default(),
            },
        }
    }

    fn owning_entry(&self, obj: ObjectId) -> Option<ObjectId> {
        let mut current = obj;
        for _ in 0..=self.records.len() {
            let record = self.record(current)?;
            if record.kind == ObjectKind::Entry {
                return Some(current);
            }
            current = record.owner?;
        }
        None
    }
}
