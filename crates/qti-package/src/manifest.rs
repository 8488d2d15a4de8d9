//! IMS Content Package manifest.

use anyhow::Result;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::ids::prefixed_identifier;
use crate::item::QtiItem;

const IMSCP_NS: &str = "http://www.imsglobal.org/xsd/imscp_v1p1";
const IMSMD_NS: &str = "http://www.imsglobal.org/xsd/imsmd_v1p2";
const IMSQTI_NS: &str = "http://www.imsglobal.org/xsd/imsqti_v2p1";
const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";
const MANIFEST_SCHEMA_LOCATION: &str = "http://www.imsglobal.org/xsd/imscp_v1p1 http://www.imsglobal.org/xsd/qti/qtiv2p1/imscp_v1p1.xsd http://www.imsglobal.org/xsd/imsmd_v1p2 http://www.imsglobal.org/xsd/qti/qtiv2p1/imsmd_v1p2p2.xsd http://www.imsglobal.org/xsd/imsqti_v2p1 http://www.imsglobal.org/xsd/qti/qtiv2p1/imsqti_v2p1.xsd";

pub const ASSESSMENT_FILENAME: &str = "assessment.xml";

/// Build `imsmanifest.xml`: one `<resource>` per generated document plus the
/// assessment-test resource declaring a `<dependency>` on every one of them.
pub fn generate_manifest(items: &[QtiItem], assessment_title: &str) -> Result<String> {
    let manifest_id = prefixed_identifier("manifest");
    let assessment_id = prefixed_identifier("assessment");

    let mut xml = Writer::new_with_indent(Vec::new(), b' ', 2);
    xml.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut root = BytesStart::new("manifest");
    root.push_attribute(("identifier", manifest_id.as_str()));
    root.push_attribute(("xmlns", IMSCP_NS));
    root.push_attribute(("xmlns:imsmd", IMSMD_NS));
    root.push_attribute(("xmlns:imsqti", IMSQTI_NS));
    root.push_attribute(("xmlns:xsi", XSI_NS));
    root.push_attribute(("xsi:schemaLocation", MANIFEST_SCHEMA_LOCATION));
    xml.write_event(Event::Start(root))?;

    xml.write_event(Event::Start(BytesStart::new("metadata")))?;
    write_text_element(&mut xml, "schema", "QTI Package")?;
    write_text_element(&mut xml, "schemaversion", "2.1")?;
    xml.write_event(Event::Start(BytesStart::new("imsmd:lom")))?;
    xml.write_event(Event::Start(BytesStart::new("imsmd:general")))?;
    xml.write_event(Event::Start(BytesStart::new("imsmd:title")))?;
    let mut title = BytesStart::new("imsmd:string");
    title.push_attribute(("language", "en"));
    xml.write_event(Event::Start(title))?;
    xml.write_event(Event::Text(BytesText::new(assessment_title.trim())))?;
    xml.write_event(Event::End(BytesEnd::new("imsmd:string")))?;
    xml.write_event(Event::End(BytesEnd::new("imsmd:title")))?;
    xml.write_event(Event::End(BytesEnd::new("imsmd:general")))?;
    xml.write_event(Event::End(BytesEnd::new("imsmd:lom")))?;
    xml.write_event(Event::End(BytesEnd::new("metadata")))?;

    xml.write_event(Event::Empty(BytesStart::new("organizations")))?;
    xml.write_event(Event::Start(BytesStart::new("resources")))?;

    let mut test_resource = BytesStart::new("resource");
    test_resource.push_attribute(("identifier", assessment_id.as_str()));
    test_resource.push_attribute(("type", "imsqti_test_xmlv2p1"));
    test_resource.push_attribute(("href", ASSESSMENT_FILENAME));
    xml.write_event(Event::Start(test_resource))?;
    write_file_element(&mut xml, ASSESSMENT_FILENAME)?;
    for item in items {
        let mut dependency = BytesStart::new("dependency");
        dependency.push_attribute(("identifierref", item.identifier.as_str()));
        xml.write_event(Event::Empty(dependency))?;
    }
    xml.write_event(Event::End(BytesEnd::new("resource")))?;

    for item in items {
        let mut resource = BytesStart::new("resource");
        resource.push_attribute(("identifier", item.identifier.as_str()));
        resource.push_attribute(("type", "imsqti_item_xmlv2p1"));
        resource.push_attribute(("href", item.filename.as_str()));
        xml.write_event(Event::Start(resource))?;
        write_file_element(&mut xml, &item.filename)?;
        xml.write_event(Event::End(BytesEnd::new("resource")))?;
    }

    xml.write_event(Event::End(BytesEnd::new("resources")))?;
    xml.write_event(Event::End(BytesEnd::new("manifest")))?;
    Ok(String::from_utf8(xml.into_inner())?)
}

fn write_file_element(xml: &mut Writer<Vec<u8>>, href: &str) -> Result<()> {
    let mut file = BytesStart::new("file");
    file.push_attribute(("href", href));
    xml.write_event(Event::Empty(file))?;
    Ok(())
}

fn write_text_element(xml: &mut Writer<Vec<u8>>, name: &str, text: &str) -> Result<()> {
    xml.write_event(Event::Start(BytesStart::new(name)))?;
    xml.write_event(Event::Text(BytesText::new(text)))?;
    xml.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}
