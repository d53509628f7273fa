// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs)]
#![allow(clippy::expect_used, clippy::panic)]
//! Entry fragments: headwords, emptiness, multistrings, media and styles.

mod common;

use common::{anchor, count, init_tracing, position, render, render_entry, text};
use lexi_config::{
    ConfigNode, NodeOptions, OptionItem, StyleKind, WritingSystemKind, WritingSystemOptions,
};
use lexi_dry_tests::lexicon::PICTURES;
use lexi_dry_tests::{
    analysis, vernacular, BasicConfig, ExcludeSet, FakeWritingSystems, FixedStyles,
    InMemoryLexicon, RecordingFiles, ENTRY_CLASS,
};
use lexi_render::ports::magic;
use lexi_render::{
    stylesheet_fragment, FileRef, Generator, MediaKind, MultiString, ObjectKind,
    RenderEnvironment, RenderOptions, Value,
};

#[test]
fn entry_renders_headword_link_and_gloss() {
    init_tracing();
    let mut lex = InMemoryLexicon::new();
    let chat = lex.add_entry("chat");
    lex.add_sense(chat, "cat");
    let ws = FakeWritingSystems::new();
    let config = BasicConfig::new("%d");

    let html = render(&lex, &ws, &config.tree, chat);
    let a = anchor(&lex, chat);
    assert!(html.starts_with(&format!("<div class=\"mainentry\" id=\"{a}\">")), "{html}");
    assert!(html.contains(&format!(
        "<span class=\"headword\"><a href=\"#{a}\"><span lang=\"fr\">chat</span></a></span>"
    )));
    assert!(html.contains(&format!(
        "<span class=\"senses\"><span class=\"sensecontent\"><span class=\"sense\" entryguid=\"{a}\">\
         <span class=\"gloss\"><span lang=\"en\">cat</span></span></span></span></span>"
    )));
    assert!(html.ends_with("</div>"));
}

#[test]
fn rendering_is_idempotent() {
    let mut lex = InMemoryLexicon::new();
    let chat = lex.add_entry("chat");
    lex.add_sense(chat, "cat");
    lex.add_sense(chat, "tomcat");
    let ws = FakeWritingSystems::new();
    let config = BasicConfig::new("%d");
    let options = RenderOptions::default();
    let env = RenderEnvironment::new(&lex, &ws);

    let mut generator = Generator::new(env, &config.tree, &options);
    let first = generator.generate_entry(chat).expect("first render");
    let second = generator.generate_entry(chat).expect("second render");
    assert_eq!(first, second);
    assert_eq!(first, render(&lex, &ws, &config.tree, chat));
}

#[test]
fn empty_values_leave_no_containers() {
    let mut lex = InMemoryLexicon::new();
    let chat = lex.add_entry("chat");
    lex.add_sense(chat, "cat");
    let bare = lex.add_object(ENTRY_CLASS, ObjectKind::Entry);
    let ws = FakeWritingSystems::new();
    let config = BasicConfig::new("%d");

    assert_eq!(render(&lex, &ws, &config.tree, bare), "");

    // A sense whose only configured field is empty vanishes with its list.
    let quiet = lex.add_entry("muet");
    lex.add_sense(quiet, "");
    let html = render(&lex, &ws, &config.tree, quiet);
    assert!(html.contains(&text("muet")));
    assert!(!html.contains("senses"), "{html}");
    assert!(!html.contains("sensecontent"));
}

#[test]
fn disabled_nodes_render_nothing() {
    let mut lex = InMemoryLexicon::new();
    let chat = lex.add_entry("chat");
    lex.add_sense(chat, "cat");
    let ws = FakeWritingSystems::new();
    let mut config = BasicConfig::new("%d");
    config.tree[config.headword].enabled = false;

    let html = render(&lex, &ws, &config.tree, chat);
    assert!(!html.contains("headword"));
    assert!(html.contains(&text("cat")));

    config.tree[config.main].enabled = false;
    assert_eq!(render(&lex, &ws, &config.tree, chat), "");
}

#[test]
fn custom_fields_resolve_and_can_be_hidden() {
    let mut lex = InMemoryLexicon::new();
    let chat = lex.add_entry("chat");
    let chien = lex.add_entry("chien");
    lex.set_custom(chat, ENTRY_CLASS, "EtymNote", Value::String("from Latin <cattus>".into()));
    let ws = FakeWritingSystems::new();
    let mut config = BasicConfig::new("%d");
    config.add(config.main, ConfigNode::new("Etymology Note", "EtymNote").custom());
    config.add(
        config.main,
        ConfigNode::new("Undefined Note", "LexSense.Nothing").custom(),
    );

    let html = render(&lex, &ws, &config.tree, chat);
    assert!(html.contains("<span class=\"etymologynote\">from Latin &lt;cattus&gt;</span>"));
    assert!(!html.contains("undefinednote"));

    // Defined for the class but unset on this entry.
    assert!(!render(&lex, &ws, &config.tree, chien).contains("etymologynote"));

    config.tree[config.main].hide_custom_fields = true;
    assert!(!render(&lex, &ws, &config.tree, chat).contains("etymologynote"));
}

#[test]
fn multistring_follows_configured_writing_system_order() {
    let mut lex = InMemoryLexicon::new();
    let chat = lex.add_entry("chat");
    lex.set(
        chat,
        "LexemeForm",
        Value::Multi(MultiString::new().with("fr", "chat").with("ar", "قط")),
    );
    let ws = FakeWritingSystems::new();
    let mut config = BasicConfig::new("%d");
    config.add(
        config.main,
        ConfigNode::new("Lexeme Form", "LexemeForm").with_options(vernacular(&["ar", "fr"])),
    );

    let html = render(&lex, &ws, &config.tree, chat);
    assert!(html.contains(
        "<span class=\"lexemeform\"><span lang=\"ar\" dir=\"rtl\">قط</span><span lang=\"fr\">chat</span></span>"
    ), "{html}");
}

#[test]
fn multistring_skips_missing_and_duplicate_writing_systems() {
    let mut lex = InMemoryLexicon::new();
    let chat = lex.add_entry("chat");
    let ws = FakeWritingSystems::new();
    let mut config = BasicConfig::new("%d");
    config.add(
        config.main,
        ConfigNode::new("Lexeme Form", "LexemeForm")
            .with_options(vernacular(&["ar", "fr", magic::VERNACULAR])),
    );

    let html = render(&lex, &ws, &config.tree, chat);
    assert!(html.contains("<span class=\"lexemeform\"><span lang=\"fr\">chat</span></span>"), "{html}");
}

#[test]
fn best_writing_system_tokens_take_first_available() {
    let mut lex = InMemoryLexicon::new();
    let arabic_only = lex.add_entry("قط");
    lex.set(
        arabic_only,
        "LexemeForm",
        Value::Multi(MultiString::new().with("ar", "قط")),
    );
    let both = lex.add_entry("chat");
    lex.set(
        both,
        "LexemeForm",
        Value::Multi(MultiString::new().with("ar", "قط").with("fr", "chat")),
    );
    let ws = FakeWritingSystems::new();
    let mut config = BasicConfig::new("%d");
    config.tree[config.headword].enabled = false;
    config.add(
        config.main,
        ConfigNode::new("Lexeme Form", "LexemeForm").with_options(vernacular(&[magic::BEST_VERNACULAR])),
    );

    let html = render(&lex, &ws, &config.tree, arabic_only);
    assert!(html.contains("<span lang=\"ar\" dir=\"rtl\">قط</span>"));

    let html = render(&lex, &ws, &config.tree, both);
    assert!(html.contains("<span lang=\"fr\">chat</span>"));
    assert!(!html.contains("lang=\"ar\""), "{html}");
}

#[test]
fn writing_system_abbreviations_prefix_each_alternative() {
    let mut lex = InMemoryLexicon::new();
    let chat = lex.add_entry("chat");
    let ws = FakeWritingSystems::new();
    let mut config = BasicConfig::new("%d");
    config.add(
        config.main,
        ConfigNode::new("Lexeme Form", "LexemeForm").with_options(NodeOptions::WritingSystem(
            WritingSystemOptions {
                kind: WritingSystemKind::Vernacular,
                options: vec![OptionItem::enabled("fr"), OptionItem::disabled("ar")],
                display_abbreviations: true,
            },
        )),
    );

    let html = render(&lex, &ws, &config.tree, chat);
    assert!(html.contains(
        "<span class=\"lexemeform\"><span class=\"writingsystemprefix\">Fr</span><span lang=\"fr\">chat</span></span>"
    ), "{html}");
}

#[test]
fn separators_are_written_only_when_inline() {
    let mut lex = InMemoryLexicon::new();
    let chat = lex.add_entry("chat");
    lex.set(
        chat,
        "LexemeForm",
        Value::Multi(MultiString::new().with("fr", "chat").with("ar", "قط")),
    );
    let ws = FakeWritingSystems::new();
    let mut config = BasicConfig::new("%d");
    config.add(
        config.main,
        ConfigNode::new("Lexeme Form", "LexemeForm")
            .with_options(vernacular(&["fr", "ar"]))
            .with_separators("<", "; ", ">"),
    );
    let env = RenderEnvironment::new(&lex, &ws);

    let plain = render_entry(env, &config.tree, &RenderOptions::default(), chat);
    assert!(!plain.contains("; "));
    assert!(!plain.contains("&lt;"));

    let inline = RenderOptions {
        inline_separators: true,
        ..RenderOptions::default()
    };
    let html = render_entry(env, &config.tree, &inline, chat);
    assert!(html.contains(
        "&lt;<span class=\"lexemeform\"><span lang=\"fr\">chat</span>; <span lang=\"ar\" dir=\"rtl\">قط</span></span>&gt;"
    ), "{html}");
}

#[test]
fn excluded_objects_are_left_out() {
    let mut lex = InMemoryLexicon::new();
    let chat = lex.add_entry("chat");
    lex.add_sense(chat, "cat");
    let hidden = lex.add_sense(chat, "spy");
    let ws = FakeWritingSystems::new();
    let filter = ExcludeSet::new([hidden]);
    let config = BasicConfig::new("%d");
    let env = RenderEnvironment::new(&lex, &ws).with_filter(&filter);

    let html = render_entry(env, &config.tree, &RenderOptions::default(), chat);
    assert!(html.contains(&text("cat")));
    assert!(!html.contains(&text("spy")));
    // One sense left, so it is not numbered.
    assert!(!html.contains("sensenumber"), "{html}");
}

fn picture_config() -> BasicConfig {
    let mut config = BasicConfig::new("%d");
    let pictures = config.add(config.senses, ConfigNode::new("Pictures", PICTURES));
    config.add(pictures, ConfigNode::new("Picture File", "PictureFileRA"));
    config
}

#[test]
fn pictures_render_as_images_through_the_file_service() {
    let mut lex = InMemoryLexicon::new();
    let chat = lex.add_entry("chat");
    let sense = lex.add_sense(chat, "cat");
    let picture = lex.add_picture(sense, "pictures/cat.jpg");
    let ws = FakeWritingSystems::new();
    let files = RecordingFiles::new();
    let config = picture_config();
    let env = RenderEnvironment::new(&lex, &ws).with_files(&files);

    let html = render_entry(env, &config.tree, &RenderOptions::default(), chat);
    let Some(Value::File(file)) = lexi_render::FieldAccessor::get_field(&lex, picture, "PictureFileRA")
    else {
        panic!("picture has a file");
    };
    assert!(html.contains(&format!(
        "<span class=\"pictures\"><span class=\"picture\"><img class=\"picturefile\" src=\"media/cat.jpg\" id=\"{}\"/></span></span>",
        anchor(&lex, file.id)
    )), "{html}");
    assert_eq!(
        files.requests(),
        vec![("pictures/cat.jpg".to_owned(), MediaKind::Picture)]
    );
}

#[test]
fn missing_media_is_skipped() {
    init_tracing();
    let mut lex = InMemoryLexicon::new();
    let chat = lex.add_entry("chat");
    let sense = lex.add_sense(chat, "cat");
    lex.add_picture(sense, "pictures/gone.png");
    let ws = FakeWritingSystems::new();
    let files = RecordingFiles::new().with_missing("pictures/gone.png");
    let config = picture_config();
    let env = RenderEnvironment::new(&lex, &ws).with_files(&files);

    let html = render_entry(env, &config.tree, &RenderOptions::default(), chat);
    assert!(!html.contains("pictures"), "{html}");
    assert!(html.contains(&text("cat")));
    assert_eq!(files.requests().len(), 1);
}

#[test]
fn audio_and_other_files_pick_elements_by_extension() {
    let mut lex = InMemoryLexicon::new();
    let chat = lex.add_entry("chat");
    let sound = lex.add_object("CmFile", ObjectKind::Other);
    let doc = lex.add_object("CmFile", ObjectKind::Other);
    lex.set(
        chat,
        "Pronunciation",
        Value::File(FileRef {
            id: sound,
            path: "audio/chat.mp3".into(),
        }),
    );
    lex.set(
        chat,
        "Source",
        Value::File(FileRef {
            id: doc,
            path: "notes/chat & co.pdf".into(),
        }),
    );
    let ws = FakeWritingSystems::new();
    let files = RecordingFiles::new();
    let mut config = BasicConfig::new("%d");
    config.add(config.main, ConfigNode::new("Pronunciation", "Pronunciation"));
    config.add(config.main, ConfigNode::new("Source", "Source"));
    let env = RenderEnvironment::new(&lex, &ws).with_files(&files);

    let html = render_entry(env, &config.tree, &RenderOptions::default(), chat);
    assert!(html.contains(&format!(
        "<audio class=\"pronunciation\" id=\"{}\"><source src=\"media/chat.mp3\"/></audio>",
        anchor(&lex, sound)
    )), "{html}");
    assert!(html.contains("<a class=\"source\" href=\"media/chat &amp; co.pdf\">chat &amp; co.pdf</a>"));
    assert_eq!(
        files.requests(),
        vec![
            ("audio/chat.mp3".to_owned(), MediaKind::Audio),
            ("notes/chat & co.pdf".to_owned(), MediaKind::Other),
        ]
    );
}

#[test]
fn stylesheet_lists_each_styled_class_once() {
    let lex = InMemoryLexicon::new();
    let ws = FakeWritingSystems::new();
    let styles = FixedStyles::new(&[
        ("Dictionary-Gloss", "font-style: italic;"),
        ("Dictionary-Headword", "font-weight: bold;"),
        ("Dictionary-Unused", "color: red;"),
    ]);
    let mut config = BasicConfig::new("%d");
    let sub_gloss = config.tree.children(config.subsenses)[0];
    config.tree[config.headword].style = Some("Dictionary-Headword".into());
    config.tree[config.headword].style_kind = StyleKind::Character;
    config.tree[config.gloss].style = Some("Dictionary-Gloss".into());
    config.tree[sub_gloss].style = Some("Dictionary-Gloss".into());
    config.add(
        config.main,
        ConfigNode::new("Hidden", "Hidden")
            .with_style("Dictionary-Unused", StyleKind::Paragraph)
            .disabled(),
    );
    config.add(
        config.main,
        ConfigNode::new("Unknown Style", "Unknown").with_style("Nope", StyleKind::Character),
    );
    let env = RenderEnvironment::new(&lex, &ws).with_styles(&styles);

    assert_eq!(
        stylesheet_fragment(&env, &config.tree),
        ".headword { font-weight: bold; }\n.gloss { font-style: italic; }\n"
    );
}

#[test]
fn schema_lookups_are_cached_per_generator() {
    let mut lex = InMemoryLexicon::new();
    let entries: Vec<_> = (0..10)
        .map(|i| {
            let entry = lex.add_entry(&format!("mot{i}"));
            lex.add_sense(entry, &format!("word {i}"));
            entry
        })
        .collect();
    let ws = FakeWritingSystems::new();
    let config = BasicConfig::new("%d");
    let options = RenderOptions::default();
    let mut generator = Generator::new(RenderEnvironment::new(&lex, &ws), &config.tree, &options);

    generator.generate_entry(entries[0]).expect("first entry");
    let after_first = lex.schema_lookups();
    assert!(after_first > 0);
    for &entry in &entries[1..] {
        generator.generate_entry(entry).expect("entry renders");
    }
    assert_eq!(lex.schema_lookups(), after_first);
}

#[test]
fn grouping_nodes_wrap_their_children() {
    let mut lex = InMemoryLexicon::new();
    let chat = lex.add_entry("chat");
    lex.add_sense(chat, "cat");
    let ws = FakeWritingSystems::new();
    let mut config = BasicConfig::new("%d");
    let group = config.add(
        config.main,
        ConfigNode::new("Forms", "").with_options(NodeOptions::Grouping(lexi_config::GroupingOptions {
            description: None,
            display_each_in_paragraph: true,
        })),
    );
    config.add(
        group,
        ConfigNode::new("Lexeme Form", "LexemeForm").with_options(vernacular(&["fr"])),
    );
    config.add(
        group,
        ConfigNode::new("Citation Form", "CitationForm").with_options(vernacular(&["fr"])),
    );

    let html = render(&lex, &ws, &config.tree, chat);
    assert!(html.contains(
        "<div class=\"grouping_forms\"><span class=\"lexemeform\"><span lang=\"fr\">chat</span></span></div>"
    ), "{html}");
    assert!(position(&html, "grouping_forms") > position(&html, "senses"));
    assert_eq!(count(&html, "citationform"), 0);
}

#[test]
fn analysis_tokens_resolve_to_the_first_analysis_writing_system() {
    let mut lex = InMemoryLexicon::new();
    let chat = lex.add_entry("chat");
    let sense = lex.add_sense(chat, "cat");
    lex.set(
        sense,
        "Definition",
        Value::Multi(MultiString::new().with("es", "gato").with("en", "a small feline")),
    );
    let ws = FakeWritingSystems::new();
    let mut config = BasicConfig::new("%d");
    config.add(
        config.senses,
        ConfigNode::new("Definition", "Definition").with_options(analysis(&[magic::ANALYSIS, "es"])),
    );

    let html = render(&lex, &ws, &config.tree, chat);
    assert!(html.contains(
        "<span class=\"definition\"><span lang=\"en\">a small feline</span><span lang=\"es\">gato</span></span>"
    ), "{html}");
}

#[test]
fn unordered_collections_follow_sort_key_then_guid() {
    let mut lex = InMemoryLexicon::new();
    let chat = lex.add_entry("chat");
    let zebre = lex.add_entry("zèbre");
    let brise = lex.add_entry("brise");
    let abeille = lex.add_entry("abeille");
    let bise = lex.add_entry("bise");
    // Same key, so the earlier-created (lower GUID) entry comes first.
    lex.set_sort_key(brise, "b");
    lex.set_sort_key(bise, "b");
    lex.set(chat, "Related", Value::Collection(vec![zebre, bise, abeille, brise]));
    lex.set(chat, "SeeAlso", Value::Sequence(vec![zebre, abeille]));
    let ws = FakeWritingSystems::new();
    let mut config = BasicConfig::new("%d");
    let related = config.add(config.main, ConfigNode::new("Related", "Related"));
    config.add(related, ConfigNode::new("Headword", "HeadWord"));
    let see_also = config.add(config.main, ConfigNode::new("See Also", "SeeAlso"));
    config.add(see_also, ConfigNode::new("Headword", "HeadWord"));

    let html = render(&lex, &ws, &config.tree, chat);
    let related_html = &html[position(&html, "class=\"related\"")..position(&html, "class=\"seealso\"")];
    let order = [text("abeille"), text("brise"), text("bise"), text("zèbre")];
    for pair in order.windows(2) {
        assert!(
            position(related_html, &pair[0]) < position(related_html, &pair[1]),
            "{} before {} in {html}",
            pair[0],
            pair[1]
        );
    }
    // Sequences keep their stored order.
    let see_also_html = &html[position(&html, "class=\"seealso\"")..];
    assert!(position(see_also_html, &text("zèbre")) < position(see_also_html, &text("abeille")));

    assert_eq!(html, render(&lex, &ws, &config.tree, chat));
}
