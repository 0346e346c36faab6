//! Parse, write, parse again: the second write must reproduce the first.

mod common;

use pagewright::{Document, EntryKind, Object, ObjectId, XRefMode};
use pretty_assertions::assert_eq;

fn rewrite(data: Vec<u8>) -> (Document, Vec<u8>) {
    let mut doc = Document::from_bytes(data).unwrap();
    let bytes = doc.save_to_bytes().unwrap();
    (doc, bytes)
}

/// Every live object of `a` equals the same object in `b`, except `skip`.
fn assert_same_objects(a: &Document, b: &Document, skip: Option<ObjectId>) {
    let ids: Vec<ObjectId> = a.objects().map(|e| e.id()).collect();
    assert_eq!(ids, b.objects().map(|e| e.id()).collect::<Vec<_>>());
    for id in ids.into_iter().filter(|id| Some(*id) != skip) {
        assert_eq!(a.get_object(id).unwrap(), b.get_object(id).unwrap(), "object {id}");
    }
}

#[test]
fn test_legacy_roundtrip_is_fixed_point() {
    let (first_doc, first) = rewrite(common::legacy_sample());
    let (second_doc, second) = rewrite(first.clone());

    assert_eq!(String::from_utf8_lossy(&first), String::from_utf8_lossy(&second));
    assert_eq!(first, second);
    assert_eq!(second_doc.xref().mode(), XRefMode::Table);
    assert_same_objects(&first_doc, &second_doc, None);
}

#[test]
fn test_legacy_rewrite_keeps_trailer_fields() {
    let (_, bytes) = rewrite(common::legacy_sample());
    let text = String::from_utf8_lossy(&bytes);
    assert!(text.starts_with("%PDF-1.4\n"));
    assert!(text.contains("trailer\n<<\n/Size 8\n/Info 7 0 R\n/Root 1 0 R\n>>"));
    assert!(text.ends_with("%%EOF\n"));

    let doc = Document::from_bytes(bytes).unwrap();
    let info = doc.info().unwrap().unwrap();
    assert_eq!(info.title(), Some("Sample (one)"));
    assert_eq!(info.producer(), Some("pagewright tests"));
}

#[test]
fn test_stream_roundtrip_is_fixed_point() {
    let (first_doc, first) = rewrite(common::stream_sample());
    let (second_doc, second) = rewrite(first.clone());

    assert_eq!(first, second);
    assert_eq!(first_doc.xref().mode(), XRefMode::Stream(ObjectId::new(8, 0)));
    assert_eq!(second_doc.xref().mode(), XRefMode::Stream(ObjectId::new(8, 0)));
    assert_same_objects(&first_doc, &second_doc, Some(ObjectId::new(8, 0)));
}

#[test]
fn test_stream_mode_is_preserved() {
    let (_, bytes) = rewrite(common::stream_sample());
    let text = String::from_utf8_lossy(&bytes);
    assert!(!text.contains("\nxref\n"));
    assert!(!text.contains("trailer"));
    assert!(text.contains("/Type /XRef"));

    let doc = Document::from_bytes(bytes).unwrap();
    let packed = doc.xref().get(5, 0).unwrap();
    assert_eq!(packed.kind(), EntryKind::InContainer);
    assert_eq!(
        doc.get_object(ObjectId::new(5, 0))
            .unwrap()
            .as_font()
            .unwrap()
            .base_font()
            .unwrap(),
        "Courier"
    );
}

#[test]
fn test_written_xref_stream_drops_predictor() {
    let (_, bytes) = rewrite(common::stream_sample());
    let doc = Document::from_bytes(bytes).unwrap();
    let xref = doc.get_object(ObjectId::new(8, 0)).unwrap().as_stream().unwrap();
    let dict = xref.dictionary();

    assert!(!dict.contains_key("DecodeParms"));
    assert!(!dict.contains_key("Index"));
    assert_eq!(dict.get_name("Filter"), Some("FlateDecode"));
    assert_eq!(dict.get_integer("Size"), Some(10));
    assert_eq!(dict.get_reference("Root"), Some(ObjectId::new(1, 0)));
    // 10 records of 1 + 4 + 2 bytes
    assert_eq!(xref.data().len(), 70);
}

#[test]
fn test_offsets_follow_written_bytes() {
    let mut doc = Document::from_bytes(common::legacy_sample()).unwrap();
    let bytes = doc.save_to_bytes().unwrap();

    for entry in doc.objects() {
        let offset = entry.offset().unwrap() as usize;
        let header = format!("{} {} obj", entry.number(), entry.generation());
        assert!(bytes[offset..].starts_with(header.as_bytes()), "{}", entry.id());
    }
}

#[test]
fn test_legacy_mode_flattens_packed_objects() {
    let doc = Document::from_bytes(common::stream_sample()).unwrap();
    let mut legacy = Document::new();
    legacy.set_version(doc.version().to_string());

    // rebuild the same objects in a table-mode document
    for entry in doc.objects() {
        if entry.id() == ObjectId::new(8, 0) {
            continue;
        }
        let value = entry.value().unwrap().clone();
        while legacy.xref().max_object_number() + 1 < entry.number() {
            legacy.add_object(Object::Null).unwrap();
        }
        legacy.add_object(value).unwrap();
    }
    legacy.trailer_mut().set_root(ObjectId::new(1, 0));

    let bytes = legacy.save_to_bytes().unwrap();
    let reread = Document::from_bytes(bytes).unwrap();
    assert_eq!(reread.xref().mode(), XRefMode::Table);
    assert!(reread
        .objects()
        .all(|entry| entry.kind() == EntryKind::Used));
    assert_eq!(
        reread.get_object(ObjectId::new(6, 0)).unwrap().as_dict().unwrap().get("Note"),
        Some(&Object::String("packed".to_string()))
    );
    assert_eq!(reread.page_ids().unwrap().len(), 2);
}

#[test]
fn test_save_and_open_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sample.pdf");

    let mut doc = Document::from_bytes(common::legacy_sample()).unwrap();
    doc.save(&path).unwrap();

    let reopened = Document::open(&path).unwrap();
    assert_eq!(reopened.page_ids().unwrap(), vec![ObjectId::new(3, 0)]);
    assert_eq!(
        reopened.page_content(ObjectId::new(3, 0)).unwrap(),
        common::CONTENT.to_vec()
    );
}
