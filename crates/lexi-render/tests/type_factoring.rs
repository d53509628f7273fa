// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs)]
#![allow(clippy::expect_used, clippy::panic)]
//! Variants, subentries and minor entries grouped under their types.

mod common;

use common::{anchor, count, option_id, position, render, text};
use lexi_config::{ConfigNode, ConfigNodeId, ListId};
use lexi_dry_tests::lexicon::{OWNING_ENTRY, VARIANT_BACK_REFS};
use lexi_dry_tests::{analysis, list, BasicConfig, FakeWritingSystems, InMemoryLexicon};
use lexi_render::{schema, Guid};

fn abbreviation(text: &str) -> String {
    format!("<span class=\"abbreviation\"><span lang=\"en\">{text}</span></span>")
}

/// Adds `label` > Abbreviation under `parent`, selecting `types_field`.
fn type_node(config: &mut BasicConfig, parent: ConfigNodeId, label: &str, types_field: &str) {
    let node = config.add(parent, ConfigNode::new(label, types_field));
    config.add(
        node,
        ConfigNode::new("Abbreviation", "Abbreviation").with_options(analysis(&["en"])),
    );
}

struct Variants {
    lex: InMemoryLexicon,
    cle: lexi_render::ObjectId,
    spelling: lexi_render::ObjectId,
    dialect: lexi_render::ObjectId,
}

/// `clé` with a spelling variant, a dialect variant and an untyped one.
fn variants() -> Variants {
    let mut lex = InMemoryLexicon::new();
    let cle = lex.add_entry("clé");
    let spelling = lex.add_entry_type("spelling variant", "sp. var.");
    let dialect = lex.add_entry_type("dialectal variant", "dial.");
    let clef = lex.add_entry("clef");
    let cley = lex.add_entry("cley");
    let kley = lex.add_entry("kley");
    lex.add_variant(clef, cle, &[spelling]);
    lex.add_variant(cley, cle, &[dialect]);
    lex.add_variant(kley, cle, &[]);
    Variants {
        lex,
        cle,
        spelling,
        dialect,
    }
}

fn variant_config(option_ids: &[String]) -> BasicConfig {
    let mut config = BasicConfig::new("%d");
    let forms = config.add(
        config.main,
        ConfigNode::new("Variant Forms", VARIANT_BACK_REFS).with_options(list(ListId::Variant, option_ids)),
    );
    type_node(&mut config, forms, "Variant Type", schema::VARIANT_ENTRY_TYPES);
    config.add(
        forms,
        ConfigNode::new("Variant Headword", OWNING_ENTRY).with_sub_field("HeadWord"),
    );
    config
}

#[test]
fn variants_are_grouped_under_configured_types() {
    let Variants {
        lex,
        cle,
        spelling,
        dialect,
    } = variants();
    let ws = FakeWritingSystems::new();
    let config = variant_config(&[option_id(&lex, dialect), option_id(&lex, spelling)]);

    let html = render(&lex, &ws, &config.tree, cle);
    let order = [
        text("kley"),
        abbreviation("dial."),
        text("cley"),
        abbreviation("sp. var."),
        text("clef"),
    ];
    for pair in order.windows(2) {
        assert!(
            position(&html, &pair[0]) < position(&html, &pair[1]),
            "{} before {} in {html}",
            pair[0],
            pair[1]
        );
    }
    assert!(html.contains("<span class=\"variantforms\"><span class=\"variantform\">"));
    assert_eq!(count(&html, "class=\"varianttype\""), 2);
}

#[test]
fn variant_headwords_link_to_the_variant_entry() {
    let Variants {
        lex, cle, spelling, ..
    } = variants();
    let ws = FakeWritingSystems::new();
    let config = variant_config(&[option_id(&lex, spelling)]);

    let html = render(&lex, &ws, &config.tree, cle);
    let clef = lexi_render::schema::objects(&lex, cle, VARIANT_BACK_REFS)[0];
    let clef_entry = match lexi_render::FieldAccessor::get_field(&lex, clef, OWNING_ENTRY) {
        Some(lexi_render::Value::Object(entry)) => entry,
        other => panic!("variant ref owner: {other:?}"),
    };
    assert!(html.contains(&format!(
        "<span class=\"variantheadword\"><a href=\"#{}\"><span lang=\"fr\">clef</span></a></span>",
        anchor(&lex, clef_entry)
    )), "{html}");
}

#[test]
fn unlisted_variant_types_are_hidden() {
    let Variants {
        lex, cle, spelling, ..
    } = variants();
    let ws = FakeWritingSystems::new();
    let config = variant_config(&[option_id(&lex, spelling)]);

    let html = render(&lex, &ws, &config.tree, cle);
    assert!(html.contains(&text("clef")));
    assert!(html.contains(&text("kley")));
    assert!(!html.contains(&text("cley")), "{html}");
    assert!(!html.contains(&abbreviation("dial.")));
}

#[test]
fn type_headers_need_an_enabled_child() {
    let Variants {
        lex,
        cle,
        spelling,
        dialect,
    } = variants();
    let ws = FakeWritingSystems::new();
    let mut config = variant_config(&[option_id(&lex, dialect), option_id(&lex, spelling)]);
    let forms = config.tree.children(config.main)[2];
    let header = config.tree.children(forms)[0];
    let abbreviation_node = config.tree.children(header)[0];
    config.tree[abbreviation_node].enabled = false;

    let html = render(&lex, &ws, &config.tree, cle);
    assert!(!html.contains("varianttype"), "{html}");
    // Members still come out grouped by type.
    assert!(position(&html, &text("cley")) < position(&html, &text("clef")));
}

#[test]
fn subentries_appear_once_under_their_first_listed_type() {
    let mut lex = InMemoryLexicon::new();
    let pomme = lex.add_entry("pomme");
    let compound = lex.add_entry_type("compound", "comp.");
    let idiom = lex.add_entry_type("idiom", "id.");
    let terre = lex.add_entry("pomme de terre");
    let pommeraie = lex.add_entry("pommeraie");
    let api = lex.add_entry("pomme d'api");
    lex.add_complex_form(terre, &[pomme], &[pomme], &[idiom, compound]);
    lex.add_complex_form(pommeraie, &[pomme], &[pomme], &[idiom]);
    lex.add_complex_form(api, &[pomme], &[pomme], &[]);
    let ws = FakeWritingSystems::new();
    let mut config = BasicConfig::new("%d");
    let subentries = config.add(
        config.main,
        ConfigNode::new("Subentries", schema::SUBENTRIES_PREFIX).with_options(list(
            ListId::Complex,
            &[option_id(&lex, compound), option_id(&lex, idiom)],
        )),
    );
    config.add(subentries, ConfigNode::new("Headword", "HeadWord"));
    type_node(&mut config, subentries, "Complex Form Type", schema::COMPLEX_ENTRY_TYPES);

    let html = render(&lex, &ws, &config.tree, pomme);
    assert_eq!(count(&html, &text("pomme de terre")), 1, "{html}");
    let order = [
        text("pomme d'api"),
        abbreviation("comp."),
        text("pomme de terre"),
        abbreviation("id."),
        text("pommeraie"),
    ];
    for pair in order.windows(2) {
        assert!(
            position(&html, &pair[0]) < position(&html, &pair[1]),
            "{} before {} in {html}",
            pair[0],
            pair[1]
        );
    }
}

#[test]
fn minor_entries_use_the_part_listing_their_type() {
    let Variants {
        lex,
        cle,
        spelling,
        ..
    } = variants();
    let ws = FakeWritingSystems::new();
    let mut config = BasicConfig::new("%d");
    let ids = [option_id(&lex, spelling)];
    let minor = config.tree.add_part(
        ConfigNode::new("Minor Entry", "LexEntry").with_options(list(ListId::Minor, &ids)),
    );
    config.add(minor, ConfigNode::new("Headword", "HeadWord"));
    let variant_of = config.add(
        minor,
        ConfigNode::new("Variant Of", schema::MAIN_ENTRY_REFS).with_options(list(ListId::Minor, &ids)),
    );
    type_node(&mut config, variant_of, "Variant Type", schema::VARIANT_ENTRY_TYPES);
    let main_form = config.add(variant_of, ConfigNode::new("Main Form", schema::COMPONENT_LEXEMES));
    config.add(main_form, ConfigNode::new("Headword", "HeadWord"));
    config.relink().expect("tree links");

    let refs = lexi_render::schema::objects(&lex, cle, VARIANT_BACK_REFS);
    let entry_of = |r: lexi_render::ObjectId| match lexi_render::FieldAccessor::get_field(&lex, r, OWNING_ENTRY) {
        Some(lexi_render::Value::Object(entry)) => entry,
        other => panic!("variant ref owner: {other:?}"),
    };
    let (clef, cley) = (entry_of(refs[0]), entry_of(refs[1]));

    let html = render(&lex, &ws, &config.tree, clef);
    assert!(html.starts_with(&format!("<div class=\"minorentry\" id=\"{}\">", anchor(&lex, clef))), "{html}");
    assert!(position(&html, &text("clef")) < position(&html, &abbreviation("sp. var.")));
    assert!(position(&html, &abbreviation("sp. var.")) < position(&html, &text("clé")));
    assert!(html.contains(&format!("<a href=\"#{}\">", anchor(&lex, cle))));

    // A variant whose type no minor part lists falls back to the main part.
    let html = render(&lex, &ws, &config.tree, cley);
    assert!(html.starts_with("<div class=\"mainentry\""), "{html}");
    let html = render(&lex, &ws, &config.tree, cle);
    assert!(html.starts_with("<div class=\"mainentry\""), "{html}");
}

#[test]
fn main_entry_refs_list_untyped_then_complex_then_variant() {
    let mut lex = InMemoryLexicon::new();
    let forme = lex.add_entry("forme");
    let compound = lex.add_entry_type("compound", "comp.");
    let spelling = lex.add_entry_type("spelling variant", "sp. var.");
    let abri = lex.add_entry("abri");
    let bague = lex.add_entry("bague");
    let cerise = lex.add_entry("cerise");
    let dune = lex.add_entry("dune");
    lex.add_variant(forme, abri, &[spelling]);
    lex.add_complex_form(forme, &[bague], &[], &[compound]);
    let to_dune = lex.add_variant(forme, dune, &[]);
    lex.add_variant(forme, cerise, &[]);
    // Stored after the `cerise` ref in GUID order.
    lex.set_guid(to_dune, Guid::from_u128(u128::MAX));
    let ws = FakeWritingSystems::new();
    let mut config = BasicConfig::new("%d");
    let refs = config.add(
        config.main,
        ConfigNode::new("Forms Of", schema::MAIN_ENTRY_REFS).with_options(list(
            ListId::Minor,
            &[option_id(&lex, spelling), option_id(&lex, compound)],
        )),
    );
    type_node(&mut config, refs, "Variant Type", schema::VARIANT_ENTRY_TYPES);
    type_node(&mut config, refs, "Complex Form Type", schema::COMPLEX_ENTRY_TYPES);
    let main_form = config.add(refs, ConfigNode::new("Main Form", schema::COMPONENT_LEXEMES));
    config.add(main_form, ConfigNode::new("Headword", "HeadWord"));

    let html = render(&lex, &ws, &config.tree, forme);
    let order = [
        text("forme"),
        text("cerise"),
        text("dune"),
        abbreviation("comp."),
        text("bague"),
        abbreviation("sp. var."),
        text("abri"),
    ];
    for pair in order.windows(2) {
        assert!(
            position(&html, &pair[0]) < position(&html, &pair[1]),
            "{} before {} in {html}",
            pair[0],
            pair[1]
        );
    }
    assert_eq!(count(&html, &abbreviation("comp.")), 1);
    assert_eq!(count(&html, &abbreviation("sp. var.")), 1);
}
