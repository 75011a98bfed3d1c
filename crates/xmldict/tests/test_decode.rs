use helios_xmldict::{
    DecodeOptions, NodeValue, Result, XmlDictError, decode, from_xml_reader, from_xml_str, parse,
};
use serde_json::{Value, json};

fn decode_json(xml: &str) -> Result<Value> {
    Ok(from_xml_str(xml, &DecodeOptions::default())?.to_json())
}

const CATALOG: &str = r#"<books type="fiction">
  <book available="" author="George Orwell">
    <isbn>973523442132</isbn>
    <title>1984</title>
  </book>
  <book available="false" author="Isaac Asimov">
    <price>$15.61</price>
    <isbn>57352342132</isbn>
    <title><![CDATA[Foundation]]></title>
  </book>
  <book available="true" author="Robert A Heinlein">
    <price discount="10%">$18.00</price>
    <isbn>341232132</isbn>
    <title><![CDATA[Stranger in a Strange Land]]></title>
  </book>
</books>
"#;

#[test]
fn test_decode_catalog() -> Result<()> {
    assert_eq!(
        decode_json(CATALOG)?,
        json!({
            "@attributes": {"type": "fiction"},
            "book": [
                {
                    "@attributes": {"available": "", "author": "George Orwell"},
                    "isbn": "973523442132",
                    "title": "1984"
                },
                {
                    "@attributes": {"available": "false", "author": "Isaac Asimov"},
                    "price": "$15.61",
                    "isbn": "57352342132",
                    "title": "Foundation"
                },
                {
                    "@attributes": {"available": "true", "author": "Robert A Heinlein"},
                    "price": {"@attributes": {"discount": "10%"}, "@text": "$18.00"},
                    "isbn": "341232132",
                    "title": "Stranger in a Strange Land"
                }
            ]
        })
    );
    Ok(())
}

#[test]
fn test_decode_preserves_document_order() -> Result<()> {
    let value = from_xml_str(CATALOG, &DecodeOptions::default())?;
    let second = &value.get("book").unwrap().as_sequence().unwrap()[1];
    let keys: Vec<&str> = second.as_map().unwrap().keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["@attributes", "price", "isbn", "title"]);

    let attributes: Vec<&str> = second
        .get("@attributes")
        .and_then(NodeValue::as_map)
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(attributes, vec!["available", "author"]);
    Ok(())
}

#[test]
fn test_decode_book_scenario() -> Result<()> {
    let xml = r#"<book available="" author="George Orwell"><isbn>973523442132</isbn><title>1984</title></book>"#;
    assert_eq!(
        decode_json(xml)?,
        json!({
            "@attributes": {"available": "", "author": "George Orwell"},
            "isbn": "973523442132",
            "title": "1984"
        })
    );
    Ok(())
}

#[test]
fn test_decode_empty_root() -> Result<()> {
    assert_eq!(decode_json("<books/>")?, json!({}));
    assert_eq!(decode_json("<books></books>")?, json!({}));
    Ok(())
}

#[test]
fn test_decode_text_root_is_bare_scalar() -> Result<()> {
    let value = from_xml_str("<books>1984</books>", &DecodeOptions::default())?;
    assert_eq!(value, NodeValue::from("1984"));
    Ok(())
}

#[test]
fn test_decode_attributes_only() -> Result<()> {
    assert_eq!(
        decode_json(r#"<books type="fiction" year="2011"/>"#)?,
        json!({"@attributes": {"type": "fiction", "year": "2011"}})
    );
    Ok(())
}

#[test]
fn test_decode_whitespace_only_leaf_text() -> Result<()> {
    assert_eq!(decode_json("<r><pad>  </pad></r>")?, json!({"pad": "  "}));
    assert_eq!(decode_json("<pad>\t</pad>")?, json!("\t"));
    Ok(())
}

#[test]
fn test_decode_keep_blank_text() -> Result<()> {
    let options = DecodeOptions {
        strip_blank_text: false,
        ..Default::default()
    };
    let value = from_xml_str("<r>\n  <a>1</a>\n</r>", &options)?;
    assert_eq!(value.to_json(), json!({"@text": "\n  \n", "a": "1"}));
    Ok(())
}

#[test]
fn test_decode_text_is_not_trimmed() -> Result<()> {
    assert_eq!(decode_json("<t>  padded  </t>")?, json!("  padded  "));
    Ok(())
}

#[test]
fn test_decode_entities() -> Result<()> {
    assert_eq!(
        decode_json(r#"<q op="&lt;&#x3d;">a &amp; b</q>"#)?,
        json!({"@attributes": {"op": "<="}, "@text": "a & b"})
    );
    Ok(())
}

#[test]
fn test_decode_namespace_declarations() -> Result<()> {
    let xml = r#"<Patient xmlns="http://hl7.org/fhir"><name xmlns="http://hl7.org/fhir"><family>Doe</family></name></Patient>"#;
    assert_eq!(
        decode_json(xml)?,
        json!({
            "@attributes": {"xmlns": "http://hl7.org/fhir"},
            "name": {"family": "Doe"}
        })
    );

    let raw = from_xml_str(
        xml,
        &DecodeOptions {
            namespace_clean: false,
            ..Default::default()
        },
    )?;
    assert_eq!(
        raw.to_json(),
        json!({
            "@attributes": {"xmlns": "http://hl7.org/fhir"},
            "name": {
                "@attributes": {"xmlns": "http://hl7.org/fhir"},
                "family": "Doe"
            }
        })
    );
    Ok(())
}

#[test]
fn test_decode_tree_directly() -> Result<()> {
    let root = parse("<r><a>1</a><a>2</a></r>", &DecodeOptions::default())?;
    assert_eq!(decode(&root).to_json(), json!({"a": ["1", "2"]}));
    Ok(())
}

#[test]
fn test_decode_from_reader() -> Result<()> {
    let value = from_xml_reader(std::io::Cursor::new(CATALOG), &DecodeOptions::default())?;
    assert_eq!(value.get("book").unwrap().as_sequence().unwrap().len(), 3);
    Ok(())
}

#[test]
fn test_decode_malformed() {
    for xml in ["<books><book></books>", "<books>", "not xml", "<a/><b/>"] {
        let result = from_xml_str(xml, &DecodeOptions::default());
        assert!(
            matches!(result, Err(XmlDictError::MalformedXml { .. })),
            "expected MalformedXml for {:?}",
            xml
        );
    }
}
