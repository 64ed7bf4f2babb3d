//! PresentationML package parts.
//!
//! The master, layout and theme never change and are embedded from
//! `assets/pptx/`. Everything that depends on the slides is generated here.

use super::{ImageFormat, ImagePlacement, Layout};
use crate::error::{ErrorKind, Result};
use exn::OptionExt;
use rust_embed::Embed;
use std::borrow::Cow;
use std::collections::BTreeSet;

const NS_MAIN: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
const NS_DRAWING: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const NS_REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_PACKAGE_REL: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const XML_HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

const FIRST_SLIDE_ID: usize = 256;
/// `rId1` is the master and `rId2` the theme; slides follow.
const FIRST_SLIDE_REL: usize = 3;

#[derive(Embed)]
#[folder = "../../assets/pptx/"]
struct Builtins;
impl Builtins {
    fn load(name: &str) -> Result<Cow<'static, [u8]>> {
        Self::get(name).map(|f| f.data).ok_or_raise(|| ErrorKind::MissingPart(name.to_string()))
    }
}

/// Part name and bytes for every part of the package, `[Content_Types].xml`
/// first.
pub(super) fn package(layout: Layout, slides: &[ImagePlacement]) -> Result<Vec<(String, Vec<u8>)>> {
    let mut media = Vec::with_capacity(slides.len());
    for slide in slides {
        let format = ImageFormat::from_mime(slide.image.mime())?;
        media.push((format, slide.image.decode()?));
    }
    let formats: BTreeSet<ImageFormat> = media.iter().map(|(format, _)| *format).collect();

    let mut parts = vec![
        ("[Content_Types].xml".to_string(), content_types(&formats, slides.len()).into_bytes()),
        ("_rels/.rels".to_string(), root_rels().into_bytes()),
        ("ppt/presentation.xml".to_string(), presentation(layout, slides.len()).into_bytes()),
        ("ppt/_rels/presentation.xml.rels".to_string(), presentation_rels(slides.len()).into_bytes()),
    ];
    for (part, asset) in [
        ("ppt/slideMasters/slideMaster1.xml", "slideMaster1.xml"),
        ("ppt/slideMasters/_rels/slideMaster1.xml.rels", "slideMaster1.xml.rels"),
        ("ppt/slideLayouts/slideLayout1.xml", "slideLayout1.xml"),
        ("ppt/slideLayouts/_rels/slideLayout1.xml.rels", "slideLayout1.xml.rels"),
        ("ppt/theme/theme1.xml", "theme1.xml"),
    ] {
        parts.push((part.to_string(), Builtins::load(asset)?.into_owned()));
    }
    for (index, (slide, (format, bytes))) in slides.iter().zip(media).enumerate() {
        let number = index + 1;
        let media_name = format!("image{number}.{}", format.extension());
        parts.push((format!("ppt/slides/slide{number}.xml"), slide_xml(number, slide).into_bytes()));
        parts.push((format!("ppt/slides/_rels/slide{number}.xml.rels"), slide_rels(&media_name).into_bytes()));
        parts.push((format!("ppt/media/{media_name}"), bytes));
    }
    Ok(parts)
}

fn escape_xml(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(text);
    }
    let mut escaped = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            c => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

fn content_types(formats: &BTreeSet<ImageFormat>, slides: usize) -> String {
    let mut xml = String::from(XML_HEADER);
    xml.push_str(r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#);
    xml.push_str(r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#);
    xml.push_str(r#"<Default Extension="xml" ContentType="application/xml"/>"#);
    for format in formats {
        xml.push_str(&format!(
            r#"<Default Extension="{}" ContentType="{}"/>"#,
            format.extension(),
            format.content_type()
        ));
    }
    for (part, content_type) in [
        ("/ppt/presentation.xml", "presentationml.presentation.main+xml"),
        ("/ppt/slideMasters/slideMaster1.xml", "presentationml.slideMaster+xml"),
        ("/ppt/slideLayouts/slideLayout1.xml", "presentationml.slideLayout+xml"),
        ("/ppt/theme/theme1.xml", "theme+xml"),
    ] {
        xml.push_str(&format!(
            r#"<Override PartName="{part}" ContentType="application/vnd.openxmlformats-officedocument.{content_type}"/>"#
        ));
    }
    for number in 1..=slides {
        xml.push_str(&format!(
            r#"<Override PartName="/ppt/slides/slide{number}.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/>"#
        ));
    }
    xml.push_str("</Types>");
    xml
}

fn relationship(id: &str, kind: &str, target: &str) -> String {
    format!(r#"<Relationship Id="{id}" Type="{NS_REL}/{kind}" Target="{target}"/>"#)
}

fn relationships(entries: impl IntoIterator<Item = String>) -> String {
    let mut xml = String::from(XML_HEADER);
    xml.push_str(&format!(r#"<Relationships xmlns="{NS_PACKAGE_REL}">"#));
    for entry in entries {
        xml.push_str(&entry);
    }
    xml.push_str("</Relationships>");
    xml
}

fn root_rels() -> String {
    relationships([relationship("rId1", "officeDocument", "ppt/presentation.xml")])
}

fn presentation_rels(slides: usize) -> String {
    let fixed = [
        relationship("rId1", "slideMaster", "slideMasters/slideMaster1.xml"),
        relationship("rId2", "theme", "theme/theme1.xml"),
    ];
    let slides = (1..=slides).map(|number| {
        relationship(&format!("rId{}", FIRST_SLIDE_REL + number - 1), "slide", &format!("slides/slide{number}.xml"))
    });
    relationships(fixed.into_iter().chain(slides))
}

fn presentation(layout: Layout, slides: usize) -> String {
    let (width, height) = layout.size();
    let mut xml = String::from(XML_HEADER);
    xml.push_str(&format!(r#"<p:presentation xmlns:a="{NS_DRAWING}" xmlns:r="{NS_REL}" xmlns:p="{NS_MAIN}">"#));
    xml.push_str(r#"<p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>"#);
    if slides > 0 {
        xml.push_str("<p:sldIdLst>");
        for index in 0..slides {
            xml.push_str(&format!(
                r#"<p:sldId id="{}" r:id="rId{}"/>"#,
                FIRST_SLIDE_ID + index,
                FIRST_SLIDE_REL + index
            ));
        }
        xml.push_str("</p:sldIdLst>");
    }
    xml.push_str(&format!(r#"<p:sldSz cx="{width}" cy="{height}"/>"#));
    xml.push_str(r#"<p:notesSz cx="6858000" cy="9144000"/>"#);
    xml.push_str("</p:presentation>");
    xml
}

fn slide_xml(number: usize, placement: &ImagePlacement) -> String {
    let mut xml = String::from(XML_HEADER);
    xml.push_str(&format!(r#"<p:sld xmlns:a="{NS_DRAWING}" xmlns:r="{NS_REL}" xmlns:p="{NS_MAIN}">"#));
    xml.push_str("<p:cSld><p:spTree>");
    xml.push_str(r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>"#);
    xml.push_str(r#"<p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#);
    xml.push_str("<p:pic><p:nvPicPr>");
    xml.push_str(&format!(
        r#"<p:cNvPr id="2" name="Picture {number}" descr="{}"/>"#,
        escape_xml(&placement.name)
    ));
    xml.push_str(r#"<p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr><p:nvPr/></p:nvPicPr>"#);
    xml.push_str(r#"<p:blipFill><a:blip r:embed="rId2"/><a:stretch><a:fillRect/></a:stretch></p:blipFill>"#);
    xml.push_str(&format!(
        r#"<p:spPr><a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr>"#,
        placement.x, placement.y, placement.width, placement.height
    ));
    xml.push_str("</p:pic>");
    xml.push_str("</p:spTree></p:cSld>");
    xml.push_str("<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>");
    xml.push_str("</p:sld>");
    xml
}

fn slide_rels(media_name: &str) -> String {
    relationships([
        relationship("rId1", "slideLayout", "../slideLayouts/slideLayout1.xml"),
        relationship("rId2", "image", &format!("../media/{media_name}")),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_present() {
        for name in [
            "slideMaster1.xml",
            "slideMaster1.xml.rels",
            "slideLayout1.xml",
            "slideLayout1.xml.rels",
            "theme1.xml",
        ] {
            assert!(!Builtins::load(name).unwrap().is_empty(), "{name}");
        }
        assert!(matches!(*Builtins::load("slideLayout2.xml").unwrap_err(), ErrorKind::MissingPart(_)));
    }

    #[test]
    fn escape_leaves_plain_text_borrowed() {
        assert!(matches!(escape_xml("Slide 1.png"), Cow::Borrowed(_)));
        assert_eq!(escape_xml(r#"a"b'c"#), "a&quot;b&apos;c");
    }

    #[test]
    fn presentation_rels_number_slides_after_theme() {
        let rels = presentation_rels(2);
        assert!(rels.contains(r#"Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide1.xml""#));
        assert!(rels.contains(r#"Id="rId4""#));
        assert!(!rels.contains(r#"Id="rId5""#));
    }

    #[test]
    fn empty_presentation_has_no_slide_list() {
        assert!(!presentation(Layout::Widescreen16x9, 0).contains("sldIdLst"));
    }
}
