#![allow(clippy::unwrap_used)]

use pretty_assertions::assert_eq;
use similar::TextDiff;
use vfblib::{
    glyph::{Node, NodeKind, Outline},
    records::{StemPpems, TtStem, TtStems},
    Entry, Glyph, Key, ReadOptions, Record, Vfb, VfbError,
};

fn hex_lines(data: &[u8]) -> String {
    data.chunks(16)
        .map(|chunk| {
            chunk
                .iter()
                .map(|b| format!("{:02x}", b))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn assert_same_bytes(expected: &[u8], actual: &[u8]) {
    if expected != actual {
        let diff = TextDiff::from_lines(&hex_lines(expected), &hex_lines(actual))
            .unified_diff()
            .to_string();
        panic!("Bytes differ:\n{}", diff);
    }
}

fn glyph(name: &str, advance: i32) -> Entry {
    let mut glyph = Glyph::new(name, 1);
    glyph.outline = Some(Outline {
        num_masters: 1,
        nodes: vec![
            Node::new(NodeKind::Move, vec![vec![(50, 0)]]),
            Node::new(NodeKind::Line, vec![vec![(50, 700)]]),
            Node::new(NodeKind::Curve, vec![vec![(450, 0), (300, 700), (450, 300)]]),
        ],
    });
    glyph.metrics = Some(vec![(advance, 0)]);
    Entry::new(Key::Glyph, Record::Glyph(Box::new(glyph)))
}

/// A small synthetic font with font info, TrueType stems, three glyphs (two
/// of them named alike), feature code and an entry of unknown type.
fn sample() -> Vec<u8> {
    let mut vfb = Vfb::new();
    let entries = vec![
        Entry::new(Key::MasterCount, Record::Int(1)),
        Entry::new(Key::FontName, Record::Text("TestSans-Regular".to_string())),
        Entry::new(Key::Upm, Record::Int(1000)),
        Entry::new(Key::WeightCode, Record::Int(-1)),
        Entry::new(
            Key::TrueTypeStems,
            Record::TtStems(TtStems {
                v: vec![TtStem {
                    width: 80,
                    name: "s1".to_string(),
                    ppm6: 20,
                }],
                h: vec![],
            }),
        ),
        Entry::new(
            Key::TrueTypeStemPpems1,
            Record::StemPpems(StemPpems {
                v: vec![vec![14]],
                h: vec![],
            }),
        ),
        Entry::new(
            Key::Features,
            Record::Lines(vec![
                "languagesystem DFLT dflt;".to_string(),
                "feature liga {".to_string(),
                "} liga;".to_string(),
                "".to_string(),
            ]),
        ),
        Entry::raw(Key::Unknown(4242), vec![0xde, 0xad, 0xbe, 0xef]),
        glyph("a", 500),
        glyph("b", 520),
        glyph("a", 540),
    ];
    for entry in entries {
        vfb.push_entry(entry).unwrap();
    }
    vfb.to_bytes().unwrap()
}

#[test]
fn test_scan_is_lazy() {
    let data = sample();
    let vfb = Vfb::from_bytes(&data).unwrap();
    assert_eq!(vfb.entries().len(), 11);
    assert_eq!(vfb.num_masters(), 1);
    assert_eq!(vfb.context().stem_counts, Some((1, 0)));
    let decoded: Vec<Key> = vfb
        .entries()
        .iter()
        .filter(|e| e.is_decoded())
        .map(|e| e.key())
        .collect();
    assert_eq!(decoded, vec![Key::MasterCount, Key::TrueTypeStems]);
    // Nothing decoded yet, so no glyphs to name
    assert!(vfb.glyph_order().is_empty());
}

#[test]
fn test_decode_all_and_glyphs() {
    let data = sample();
    let mut vfb = Vfb::from_bytes(&data).unwrap();
    vfb.decode_all().unwrap();
    assert!(!vfb.any_errors());
    assert!(vfb.entries().iter().all(|e| e.is_decoded() && !e.is_modified()));

    assert_eq!(vfb.glyph_order(), vec!["a", "b", "a#1"]);
    assert_eq!(vfb.glyph("a#1").unwrap().metrics, Some(vec![(540, 0)]));
    assert_eq!(vfb.glyph("b").unwrap().contours(0).len(), 1);

    assert_eq!(
        vfb.find(Key::TrueTypeStemPpems1).unwrap().decoded(),
        Some(&Record::StemPpems(StemPpems {
            v: vec![vec![14]],
            h: vec![],
        }))
    );
    assert_eq!(
        vfb.find(Key::Unknown(4242)).unwrap().decoded(),
        Some(&Record::Bytes(vec![0xde, 0xad, 0xbe, 0xef]))
    );
    let features = vfb.features().unwrap();
    assert_eq!(features.features.len(), 1);
    assert_eq!(features.prefixes["anonymous"], "languagesystem DFLT dflt;");
}

#[test]
fn test_unmodified_round_trip() {
    let data = sample();
    let mut vfb = Vfb::from_bytes(&data).unwrap();
    assert_same_bytes(&data, &vfb.to_bytes().unwrap());
    vfb.decode_all().unwrap();
    assert_same_bytes(&data, &vfb.to_bytes().unwrap());
    // Forcing recompilation of everything with an encoder gives the same
    let context = *vfb.context();
    for entry in vfb.entries_mut() {
        if entry.key().is_known() {
            entry.compile(&context, true).unwrap();
        }
    }
    assert_same_bytes(&data, &vfb.to_bytes().unwrap());
}

#[test]
fn test_modify_and_write() {
    let mut vfb = Vfb::from_bytes(&sample()).unwrap();
    vfb.decode_all().unwrap();
    for entry in vfb.entries_mut() {
        match entry.key() {
            Key::Upm => *entry.decoded_mut().unwrap() = Record::Int(2048),
            Key::Glyph => {
                let glyph = entry.decoded_mut().unwrap().as_glyph_mut().unwrap();
                if glyph.name.as_deref() == Some("b") {
                    glyph.name = Some("c".to_string());
                }
            }
            _ => {}
        }
    }
    let data = vfb.to_bytes().unwrap();

    let mut again = Vfb::from_bytes(&data).unwrap();
    again.decode_all().unwrap();
    assert_eq!(
        again.find(Key::Upm).unwrap().decoded().and_then(Record::as_int),
        Some(2048)
    );
    assert_eq!(again.glyph_order(), vec!["a", "c", "a#1"]);
}

#[test]
fn test_broken_entry_is_kept() {
    let mut vfb = Vfb::new();
    vfb.push_entry(Entry::raw(Key::Glyph, vec![1, 9, 7, 1, 0x42]))
        .unwrap();
    vfb.push_entry(Entry::raw(Key::Upm, vec![0xe8, 0x03])).unwrap();
    let data = vfb.to_bytes().unwrap();

    let mut vfb = Vfb::from_bytes(&data).unwrap();
    assert!(matches!(
        vfb.decode_all(),
        Err(VfbError::UnknownSubRecord { tag: 0x42 })
    ));
    assert!(vfb.any_errors());
    assert!(!vfb.entries()[0].is_decoded());
    assert!(vfb.entries()[1].is_decoded());
    assert_same_bytes(&data, &vfb.to_bytes().unwrap());
}

#[test]
fn test_renamed_glyphs_stay_unique() {
    let mut vfb = Vfb::new();
    for (name, advance) in [("A", 500), ("A#1", 510), ("A", 520)] {
        vfb.push_entry(glyph(name, advance)).unwrap();
    }
    let mut vfb = Vfb::from_bytes(&vfb.to_bytes().unwrap()).unwrap();
    vfb.decode_all().unwrap();
    assert_eq!(vfb.glyph_order(), vec!["A", "A#1", "A#2"]);
    assert_eq!(vfb.glyph("A#1").unwrap().metrics, Some(vec![(510, 0)]));
    assert_eq!(vfb.glyph("A#2").unwrap().metrics, Some(vec![(520, 0)]));
}

#[test]
fn test_uncompilable_entry_keeps_its_bytes() {
    let mut vfb = Vfb::new();
    vfb.push_entry(Entry::raw(Key::Upm, vec![0xe8, 0x03])).unwrap();
    vfb.push_entry(Entry::raw(Key::Unknown(4242), vec![0xde, 0xad]))
        .unwrap();
    let data = vfb.to_bytes().unwrap();

    let mut vfb = Vfb::from_bytes(&data).unwrap();
    vfb.decode_all().unwrap();
    for entry in vfb.entries_mut() {
        match entry.key() {
            Key::Upm => *entry.decoded_mut().unwrap() = Record::Int(2048),
            _ => *entry.decoded_mut().unwrap() = Record::Bytes(vec![1, 2, 3]),
        }
    }
    assert!(matches!(
        vfb.compile(),
        Err(VfbError::MissingEncoderForTag { tag: 4242 })
    ));
    assert!(vfb.any_errors());
    assert!(!vfb.entries()[0].is_modified());
    assert!(vfb.entries()[1].is_modified());

    let mut again = Vfb::from_bytes(&vfb.to_bytes().unwrap()).unwrap();
    again.decode_all().unwrap();
    assert_eq!(
        again.find(Key::Upm).unwrap().decoded().and_then(Record::as_int),
        Some(2048)
    );
    assert_eq!(
        again.find(Key::Unknown(4242)).unwrap().decoded(),
        Some(&Record::Bytes(vec![0xde, 0xad]))
    );
}

#[test]
fn test_minimal_read() {
    let mut vfb = Vfb::new();
    vfb.push_entry(Entry::new(Key::Upm, Record::Int(1000)))
        .unwrap();
    vfb.push_entry(Entry::new(Key::GlyphNote, Record::Text("todo".to_string())))
        .unwrap();
    let data = vfb.to_bytes().unwrap();
    let vfb = Vfb::from_bytes_with(
        &data,
        ReadOptions {
            minimal: true,
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(vfb.entries().len(), 1);
}

#[test]
fn test_missing_end_marker() {
    let data = sample();
    let truncated = &data[..data.len() - 8];
    let vfb = Vfb::from_bytes(truncated).unwrap();
    assert_eq!(vfb.entries().len(), 11);
    assert_same_bytes(&data, &vfb.to_bytes().unwrap());
}

#[test]
fn test_json() {
    let mut vfb = Vfb::from_bytes(&sample()).unwrap();
    let json = vfb.to_json().unwrap();
    assert_eq!(json["header"]["filetype"], "WLF10");
    assert_eq!(json["entries"][0], serde_json::json!({"key": "Master Count", "decompiled": 1}));
    assert_eq!(json["entries"][2], serde_json::json!({"key": "upm", "size": 2, "data": "e803"}));

    vfb.decode_all().unwrap();
    let json = vfb.to_json().unwrap();
    assert_eq!(json["entries"][1]["decompiled"], "TestSans-Regular");
    assert_eq!(json["entries"][3]["decompiled"], -1);
    assert_eq!(json["entries"][7]["key"], "4242");
    assert_eq!(json["entries"][7]["decompiled"], "deadbeef");
    assert_eq!(json["entries"][8]["decompiled"]["name"], "a");
}
