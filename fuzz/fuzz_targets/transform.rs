#![no_main]

use libfuzzer_sys::fuzz_target;
use ris_enrich::lookup::ManifestLookup;
use ris_enrich::{RecoveryMode, Tag, Transformer};

fuzz_target!(|data: &[u8]| {
    let mut lookup = ManifestLookup::new();
    lookup.insert("a.pdf", "1");
    lookup.insert("b.pdf", "2");
    lookup.insert("b.pdf", "3");

    let mut output = Vec::new();
    let summary = Transformer::new(lookup)
        .with_recovery_mode(RecoveryMode::Permissive)
        .transform(data, &mut output)
        .expect("in-memory transform cannot fail in permissive mode");

    // Backfilled subtitles all reach the output.
    let text = String::from_utf8(output).expect("output is always UTF-8");
    let subtitles = text
        .lines()
        .filter(|line| ris_enrich::tag::tag_of(line) == Some(Tag::ST))
        .count();
    assert!(subtitles >= summary.subtitles_added);
});
