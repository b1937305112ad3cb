//! Shared fixtures for integration tests

#![allow(dead_code)]

use metadict::{FileSource, XmlNode, XmlParser};
use std::path::Path;

/// Metadata record in the shape written by desktop GIS tools
pub const ROADS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<metadata xml:lang="en">
  <Esri>
    <CreaDate>20150420</CreaDate>
    <ArcGISFormat>1.0</ArcGISFormat>
    <SyncOnce>TRUE</SyncOnce>
  </Esri>
  <idinfo>
    <citation>
      <citeinfo>
        <origin>County GIS</origin>
        <title Sync="TRUE">roads</title>
      </citeinfo>
    </citation>
    <descript>
      <abstract>Road centerlines &amp; ramps maintained by the county.</abstract>
      <purpose>Routing</purpose>
    </descript>
    <keywords>
      <theme>
        <themekt>ISO 19115 Topic Category</themekt>
        <themekey>transportation</themekey>
        <themekey>roads</themekey>
      </theme>
      <place>
        <placekey>Springfield</placekey>
      </place>
    </keywords>
    <status/>
  </idinfo>
  <!-- synchronized fields -->
  <mdDateSt Sync="TRUE">20150420</mdDateSt>
</metadata>"#;

/// Parse [`ROADS_XML`]
pub fn roads_tree() -> XmlNode {
    XmlParser::new()
        .parse(ROADS_XML)
        .expect("fixture is well-formed")
}

/// File source rooted at `dir` holding the `roads` dataset
pub fn roads_file_source(dir: &Path) -> FileSource {
    std::fs::write(dir.join("roads.xml"), ROADS_XML).expect("write fixture");
    FileSource::new(dir)
}
