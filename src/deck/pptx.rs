//! PresentationML (`.pptx`) writer
//!
//! A `.pptx` file is a zip package of XML parts. This writer emits the
//! smallest package PowerPoint and LibreOffice both open: one master, two
//! layouts (title, title-only), a flat theme, and one part per slide and
//! per embedded picture. Geometry is fixed; pictures are stretched into the
//! image box without aspect correction.

use crate::deck::{Deck, ImageKind, Slide};
use crate::error::DeckError;
use htmlescape::encode_minimal;
use std::collections::BTreeSet;
use std::io::{Seek, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// MIME type of a `.pptx` package
pub const PPTX_MIME_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation";

/// English Metric Units per inch
pub const EMU_PER_INCH: i64 = 914_400;

/// Slide width (10in)
pub const SLIDE_WIDTH: i64 = 10 * EMU_PER_INCH;

/// Slide height (7.5in)
pub const SLIDE_HEIGHT: i64 = 15 * EMU_PER_INCH / 2;

/// A shape frame in EMUs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    /// Left offset
    pub x: i64,
    /// Top offset
    pub y: i64,
    /// Width
    pub cx: i64,
    /// Height
    pub cy: i64,
}

impl Rect {
    /// Build a frame from measurements in tenths of an inch
    pub const fn tenth_inches(x: i64, y: i64, cx: i64, cy: i64) -> Self {
        const TENTH: i64 = EMU_PER_INCH / 10;
        Self {
            x: x * TENTH,
            y: y * TENTH,
            cx: cx * TENTH,
            cy: cy * TENTH,
        }
    }

    fn xfrm(&self) -> String {
        format!(
            r#"<a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm>"#,
            self.x, self.y, self.cx, self.cy
        )
    }
}

/// "Slide i" label box
pub const LABEL_BOX: Rect = Rect::tenth_inches(5, 5, 90, 5);

/// Picture box
pub const IMAGE_BOX: Rect = Rect::tenth_inches(5, 15, 90, 50);

/// Title slide heading
pub const TITLE_BOX: Rect = Rect { x: 685_800, y: 2_130_425, cx: 7_772_400, cy: 1_470_025 };

/// Title slide subtitle
pub const SUBTITLE_BOX: Rect = Rect { x: 1_371_600, y: 3_886_200, cx: 6_400_800, cy: 1_752_600 };

const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;
const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_P: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
const REL_BASE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const CT_BASE: &str = "application/vnd.openxmlformats-officedocument";

const GROUP_HEADER: &str = concat!(
    r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>"#,
    r#"<p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/>"#,
    r#"<a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#
);

/// Relationship ids in `presentation.xml.rels` before the first slide
const FIXED_PRESENTATION_RELS: usize = 5;

/// Serialize `deck` as a `.pptx` package into `writer`.
///
/// Slide 1 of the package is the title slide; content slide `i` is package
/// slide `i + 1`.
pub fn write_deck<W: Write + Seek>(deck: &Deck, writer: W) -> Result<W, DeckError> {
    let mut zip = ZipWriter::new(writer);
    let xml = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let media = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    let total_slides = deck.slides.len() + 1;

    let kinds: BTreeSet<ImageKind> = deck.images().map(|(_, img)| img.kind).collect();
    put(&mut zip, "[Content_Types].xml", &content_types(total_slides, &kinds), xml)?;
    put(&mut zip, "_rels/.rels", &root_rels(), xml)?;
    put(&mut zip, "docProps/core.xml", &core_props(&deck.title), xml)?;
    put(&mut zip, "docProps/app.xml", &app_props(total_slides), xml)?;

    put(&mut zip, "ppt/presentation.xml", &presentation(total_slides), xml)?;
    put(&mut zip, "ppt/_rels/presentation.xml.rels", &presentation_rels(total_slides), xml)?;
    put(&mut zip, "ppt/presProps.xml", &pres_props(), xml)?;
    put(&mut zip, "ppt/viewProps.xml", &view_props(), xml)?;
    put(&mut zip, "ppt/tableStyles.xml", &table_styles(), xml)?;
    put(&mut zip, "ppt/theme/theme1.xml", &theme(), xml)?;
    put(&mut zip, "ppt/slideMasters/slideMaster1.xml", &slide_master(), xml)?;
    put(&mut zip, "ppt/slideMasters/_rels/slideMaster1.xml.rels", &slide_master_rels(), xml)?;
    put(&mut zip, "ppt/slideLayouts/slideLayout1.xml", &slide_layout("title", "Title Slide"), xml)?;
    put(&mut zip, "ppt/slideLayouts/_rels/slideLayout1.xml.rels", &slide_layout_rels(), xml)?;
    put(&mut zip, "ppt/slideLayouts/slideLayout2.xml", &slide_layout("titleOnly", "Title Only"), xml)?;
    put(&mut zip, "ppt/slideLayouts/_rels/slideLayout2.xml.rels", &slide_layout_rels(), xml)?;

    put(&mut zip, "ppt/slides/slide1.xml", &title_slide(&deck.title, &deck.subtitle), xml)?;
    put(&mut zip, "ppt/slides/_rels/slide1.xml.rels", &slide_rels(1, None), xml)?;

    for (i, slide) in deck.slides.iter().enumerate() {
        let number = i + 2;
        let media_name = slide
            .image
            .as_ref()
            .map(|img| format!("image{}.{}", i + 1, img.kind.extension()));

        put(&mut zip, &format!("ppt/slides/slide{}.xml", number), &content_slide(slide), xml)?;
        put(
            &mut zip,
            &format!("ppt/slides/_rels/slide{}.xml.rels", number),
            &slide_rels(2, media_name.as_deref()),
            xml,
        )?;

        if let (Some(img), Some(name)) = (&slide.image, media_name) {
            zip.start_file(format!("ppt/media/{}", name), media)?;
            zip.write_all(&img.data).map_err(zip::result::ZipError::Io)?;
        }
    }

    Ok(zip.finish()?)
}

fn put<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    name: &str,
    body: &str,
    options: SimpleFileOptions,
) -> Result<(), DeckError> {
    zip.start_file(name, options)?;
    zip.write_all(body.as_bytes()).map_err(zip::result::ZipError::Io)?;
    Ok(())
}

fn relationships(rels: &[(String, String, String)]) -> String {
    let mut out = format!(
        r#"{}<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        XML_DECL
    );
    for (id, kind, target) in rels {
        out.push_str(&format!(
            r#"<Relationship Id="{}" Type="{}" Target="{}"/>"#,
            id, kind, target
        ));
    }
    out.push_str("</Relationships>");
    out
}

fn rel(id: usize, kind: &str, target: &str) -> (String, String, String) {
    (format!("rId{}", id), format!("{}/{}", REL_BASE, kind), target.to_string())
}

fn content_types(total_slides: usize, kinds: &BTreeSet<ImageKind>) -> String {
    let mut out = format!(
        concat!(
            r#"{}<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
            r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
            r#"<Default Extension="xml" ContentType="application/xml"/>"#
        ),
        XML_DECL
    );
    for kind in kinds {
        out.push_str(&format!(
            r#"<Default Extension="{}" ContentType="{}"/>"#,
            kind.extension(),
            kind.mime_type()
        ));
    }

    let overrides = [
        ("/ppt/presentation.xml", "presentationml.presentation.main+xml"),
        ("/ppt/presProps.xml", "presentationml.presProps+xml"),
        ("/ppt/viewProps.xml", "presentationml.viewProps+xml"),
        ("/ppt/tableStyles.xml", "presentationml.tableStyles+xml"),
        ("/ppt/theme/theme1.xml", "theme+xml"),
        ("/ppt/slideMasters/slideMaster1.xml", "presentationml.slideMaster+xml"),
        ("/ppt/slideLayouts/slideLayout1.xml", "presentationml.slideLayout+xml"),
        ("/ppt/slideLayouts/slideLayout2.xml", "presentationml.slideLayout+xml"),
        ("/docProps/app.xml", "extended-properties+xml"),
    ];
    for (part, kind) in overrides {
        out.push_str(&format!(
            r#"<Override PartName="{}" ContentType="{}.{}"/>"#,
            part, CT_BASE, kind
        ));
    }
    out.push_str(concat!(
        r#"<Override PartName="/docProps/core.xml" "#,
        r#"ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>"#
    ));
    for n in 1..=total_slides {
        out.push_str(&format!(
            r#"<Override PartName="/ppt/slides/slide{}.xml" ContentType="{}.presentationml.slide+xml"/>"#,
            n, CT_BASE
        ));
    }
    out.push_str("</Types>");
    out
}

fn root_rels() -> String {
    relationships(&[
        rel(1, "officeDocument", "ppt/presentation.xml"),
        (
            "rId2".to_string(),
            "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties"
                .to_string(),
            "docProps/core.xml".to_string(),
        ),
        rel(3, "extended-properties", "docProps/app.xml"),
    ])
}

fn core_props(title: &str) -> String {
    let now = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
    format!(
        concat!(
            "{}",
            r#"<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" "#,
            r#"xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" "#,
            r#"xmlns:dcmitype="http://purl.org/dc/dcmitype/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#,
            "<dc:title>{}</dc:title><dc:creator>{}</dc:creator>",
            r#"<dcterms:created xsi:type="dcterms:W3CDTF">{}</dcterms:created>"#,
            r#"<dcterms:modified xsi:type="dcterms:W3CDTF">{}</dcterms:modified>"#,
            "</cp:coreProperties>"
        ),
        XML_DECL,
        encode_minimal(title),
        crate::NAME,
        now,
        now
    )
}

fn app_props(total_slides: usize) -> String {
    format!(
        concat!(
            "{}",
            r#"<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties" "#,
            r#"xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes">"#,
            "<Application>{}</Application><Slides>{}</Slides></Properties>"
        ),
        XML_DECL,
        crate::NAME,
        total_slides
    )
}

fn presentation(total_slides: usize) -> String {
    let mut ids = String::new();
    for n in 0..total_slides {
        ids.push_str(&format!(
            r#"<p:sldId id="{}" r:id="rId{}"/>"#,
            256 + n,
            FIXED_PRESENTATION_RELS + 1 + n
        ));
    }
    format!(
        concat!(
            r#"{}<p:presentation xmlns:a="{}" xmlns:r="{}" xmlns:p="{}" saveSubsetFonts="1">"#,
            r#"<p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>"#,
            "<p:sldIdLst>{}</p:sldIdLst>",
            r#"<p:sldSz cx="{}" cy="{}" type="screen4x3"/><p:notesSz cx="6858000" cy="9144000"/>"#,
            "</p:presentation>"
        ),
        XML_DECL, NS_A, NS_R, NS_P, ids, SLIDE_WIDTH, SLIDE_HEIGHT
    )
}

fn presentation_rels(total_slides: usize) -> String {
    let mut rels = vec![
        rel(1, "slideMaster", "slideMasters/slideMaster1.xml"),
        rel(2, "theme", "theme/theme1.xml"),
        rel(3, "presProps", "presProps.xml"),
        rel(4, "viewProps", "viewProps.xml"),
        rel(5, "tableStyles", "tableStyles.xml"),
    ];
    for n in 1..=total_slides {
        rels.push(rel(
            FIXED_PRESENTATION_RELS + n,
            "slide",
            &format!("slides/slide{}.xml", n),
        ));
    }
    relationships(&rels)
}

fn pres_props() -> String {
    format!(
        r#"{}<p:presentationPr xmlns:a="{}" xmlns:r="{}" xmlns:p="{}"/>"#,
        XML_DECL, NS_A, NS_R, NS_P
    )
}

fn view_props() -> String {
    format!(
        r#"{}<p:viewPr xmlns:a="{}" xmlns:r="{}" xmlns:p="{}"><p:gridSpacing cx="76200" cy="76200"/></p:viewPr>"#,
        XML_DECL, NS_A, NS_R, NS_P
    )
}

fn table_styles() -> String {
    format!(
        r#"{}<a:tblStyleLst xmlns:a="{}" def="{{5C22544A-7EE6-4342-B048-85BDC9FD1C3A}}"/>"#,
        XML_DECL, NS_A
    )
}

fn theme() -> String {
    let solid = r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#;
    let line = |w: u32| format!(r#"<a:ln w="{}">{}</a:ln>"#, w, solid);
    let effect = "<a:effectStyle><a:effectLst/></a:effectStyle>";
    let font = r#"<a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/>"#;
    let colors = [
        ("accent1", "4F81BD"),
        ("accent2", "C0504D"),
        ("accent3", "9BBB59"),
        ("accent4", "8064A2"),
        ("accent5", "4BACC6"),
        ("accent6", "F79646"),
        ("hlink", "0000FF"),
        ("folHlink", "800080"),
    ];
    let accents: String = colors
        .iter()
        .map(|(name, rgb)| format!(r#"<a:{0}><a:srgbClr val="{1}"/></a:{0}>"#, name, rgb))
        .collect();

    format!(
        concat!(
            r#"{}<a:theme xmlns:a="{}" name="Office Theme"><a:themeElements>"#,
            r#"<a:clrScheme name="Office">"#,
            r#"<a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1>"#,
            r#"<a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1>"#,
            r#"<a:dk2><a:srgbClr val="1F497D"/></a:dk2><a:lt2><a:srgbClr val="EEECE1"/></a:lt2>"#,
            "{}</a:clrScheme>",
            r#"<a:fontScheme name="Office"><a:majorFont>{}</a:majorFont><a:minorFont>{}</a:minorFont></a:fontScheme>"#,
            r#"<a:fmtScheme name="Office">"#,
            "<a:fillStyleLst>{}{}{}</a:fillStyleLst>",
            "<a:lnStyleLst>{}{}{}</a:lnStyleLst>",
            "<a:effectStyleLst>{}{}{}</a:effectStyleLst>",
            "<a:bgFillStyleLst>{}{}{}</a:bgFillStyleLst>",
            "</a:fmtScheme></a:themeElements></a:theme>"
        ),
        XML_DECL,
        NS_A,
        accents,
        font,
        font,
        solid,
        solid,
        solid,
        line(9525),
        line(25400),
        line(38100),
        effect,
        effect,
        effect,
        solid,
        solid,
        solid
    )
}

fn slide_master() -> String {
    let level = |sz: u32, face: &str, algn: &str| {
        format!(
            r#"<a:lvl1pPr{}><a:defRPr sz="{}"><a:solidFill><a:schemeClr val="tx1"/></a:solidFill><a:latin typeface="{}"/></a:defRPr></a:lvl1pPr>"#,
            algn, sz, face
        )
    };
    format!(
        concat!(
            r#"{}<p:sldMaster xmlns:a="{}" xmlns:r="{}" xmlns:p="{}">"#,
            r#"<p:cSld><p:bg><p:bgRef idx="1001"><a:schemeClr val="bg1"/></p:bgRef></p:bg>"#,
            "<p:spTree>{}</p:spTree></p:cSld>",
            r#"<p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" "#,
            r#"accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/>"#,
            r#"<p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/>"#,
            r#"<p:sldLayoutId id="2147483650" r:id="rId2"/></p:sldLayoutIdLst>"#,
            "<p:txStyles><p:titleStyle>{}</p:titleStyle><p:bodyStyle>{}</p:bodyStyle>",
            "<p:otherStyle>{}</p:otherStyle></p:txStyles>",
            "</p:sldMaster>"
        ),
        XML_DECL,
        NS_A,
        NS_R,
        NS_P,
        GROUP_HEADER,
        level(4400, "+mj-lt", r#" algn="ctr""#),
        level(3200, "+mn-lt", ""),
        level(1800, "+mn-lt", "")
    )
}

fn slide_master_rels() -> String {
    relationships(&[
        rel(1, "slideLayout", "../slideLayouts/slideLayout1.xml"),
        rel(2, "slideLayout", "../slideLayouts/slideLayout2.xml"),
        rel(3, "theme", "../theme/theme1.xml"),
    ])
}

fn slide_layout(kind: &str, name: &str) -> String {
    format!(
        concat!(
            r#"{}<p:sldLayout xmlns:a="{}" xmlns:r="{}" xmlns:p="{}" type="{}" preserve="1">"#,
            r#"<p:cSld name="{}"><p:spTree>{}</p:spTree></p:cSld>"#,
            "<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>"
        ),
        XML_DECL, NS_A, NS_R, NS_P, kind, name, GROUP_HEADER
    )
}

fn slide_layout_rels() -> String {
    relationships(&[rel(1, "slideMaster", "../slideMasters/slideMaster1.xml")])
}

fn slide_rels(layout: usize, media: Option<&str>) -> String {
    let mut rels = vec![rel(
        1,
        "slideLayout",
        &format!("../slideLayouts/slideLayout{}.xml", layout),
    )];
    if let Some(name) = media {
        rels.push(rel(2, "image", &format!("../media/{}", name)));
    }
    relationships(&rels)
}

fn slide_document(shapes: &str) -> String {
    format!(
        concat!(
            r#"{}<p:sld xmlns:a="{}" xmlns:r="{}" xmlns:p="{}">"#,
            "<p:cSld><p:spTree>{}{}</p:spTree></p:cSld>",
            "<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>"
        ),
        XML_DECL, NS_A, NS_R, NS_P, GROUP_HEADER, shapes
    )
}

fn text_shape(id: u32, name: &str, nv_sp: &str, nv: &str, frame: Rect, text: &str, size: Option<u32>) -> String {
    let size_attr = size.map(|s| format!(r#" sz="{}""#, s)).unwrap_or_default();
    format!(
        concat!(
            r#"<p:sp><p:nvSpPr><p:cNvPr id="{}" name="{}"/>{}<p:nvPr>{}</p:nvPr></p:nvSpPr>"#,
            r#"<p:spPr>{}<a:prstGeom prst="rect"><a:avLst/></a:prstGeom><a:noFill/></p:spPr>"#,
            r#"<p:txBody><a:bodyPr wrap="square"><a:normAutofit/></a:bodyPr><a:lstStyle/>"#,
            r#"<a:p><a:r><a:rPr lang="en-US"{} dirty="0"/><a:t>{}</a:t></a:r></a:p></p:txBody></p:sp>"#
        ),
        id,
        name,
        nv_sp,
        nv,
        frame.xfrm(),
        size_attr,
        encode_minimal(text)
    )
}

fn title_slide(title: &str, subtitle: &str) -> String {
    let heading = text_shape(
        2,
        "Title 1",
        "<p:cNvSpPr/>",
        r#"<p:ph type="ctrTitle"/>"#,
        TITLE_BOX,
        title,
        Some(4400),
    );
    let sub = text_shape(
        3,
        "Subtitle 2",
        "<p:cNvSpPr/>",
        r#"<p:ph type="subTitle" idx="1"/>"#,
        SUBTITLE_BOX,
        subtitle,
        Some(3200),
    );
    slide_document(&format!("{}{}", heading, sub))
}

fn content_slide(slide: &Slide) -> String {
    let mut shapes = text_shape(
        2,
        "TextBox 1",
        r#"<p:cNvSpPr txBox="1"/>"#,
        "",
        LABEL_BOX,
        &slide.label,
        None,
    );
    if slide.image.is_some() {
        shapes.push_str(&format!(
            concat!(
                r#"<p:pic><p:nvPicPr><p:cNvPr id="3" name="Picture 2"/>"#,
                r#"<p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr><p:nvPr/></p:nvPicPr>"#,
                r#"<p:blipFill><a:blip r:embed="rId2"/><a:stretch><a:fillRect/></a:stretch></p:blipFill>"#,
                r#"<p:spPr>{}<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr></p:pic>"#
            ),
            IMAGE_BOX.xfrm()
        ));
    }
    slide_document(&shapes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::{SlideImage, DEFAULT_TITLE};
    use std::io::{Cursor, Read};
    use zip::ZipArchive;

    const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

    fn read_part(archive: &mut ZipArchive<Cursor<Vec<u8>>>, name: &str) -> String {
        let mut part = archive.by_name(name).unwrap();
        let mut out = String::new();
        part.read_to_string(&mut out).unwrap();
        out
    }

    fn sample_deck() -> Deck {
        Deck::new(
            DEFAULT_TITLE,
            vec![
                Slide {
                    label: "Slide 1".into(),
                    image: Some(SlideImage::from_bytes(PNG_MAGIC.to_vec())),
                },
                Slide { label: "Slide 2".into(), image: None },
            ],
        )
    }

    #[test]
    fn test_geometry_constants() {
        assert_eq!(LABEL_BOX, Rect { x: 457_200, y: 457_200, cx: 8_229_600, cy: 457_200 });
        assert_eq!(IMAGE_BOX, Rect { x: 457_200, y: 1_371_600, cx: 8_229_600, cy: 4_572_000 });
        assert_eq!(SLIDE_WIDTH, 9_144_000);
        assert_eq!(SLIDE_HEIGHT, 6_858_000);
    }

    #[test]
    fn test_package_lists_title_plus_content_slides() {
        let bytes = write_deck(&sample_deck(), Cursor::new(Vec::new())).unwrap().into_inner();
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();

        let presentation = read_part(&mut archive, "ppt/presentation.xml");
        assert_eq!(presentation.matches("<p:sldId ").count(), 3);

        let title = read_part(&mut archive, "ppt/slides/slide1.xml");
        assert!(title.contains(DEFAULT_TITLE));
        assert!(title.contains("Generated with 2 slides"));

        let types = read_part(&mut archive, "[Content_Types].xml");
        assert!(types.contains(r#"Extension="png""#));
        assert!(types.contains("/ppt/slides/slide3.xml"));
    }

    #[test]
    fn test_missing_image_slide_has_label_only() {
        let bytes = write_deck(&sample_deck(), Cursor::new(Vec::new())).unwrap().into_inner();
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();

        let with_image = read_part(&mut archive, "ppt/slides/slide2.xml");
        assert!(with_image.contains("Slide 1"));
        assert!(with_image.contains("<p:pic>"));
        let rels = read_part(&mut archive, "ppt/slides/_rels/slide2.xml.rels");
        assert!(rels.contains("../media/image1.png"));

        let without = read_part(&mut archive, "ppt/slides/slide3.xml");
        assert!(without.contains("Slide 2"));
        assert!(!without.contains("<p:pic>"));
        assert!(archive.by_name("ppt/media/image2.png").is_err());
    }

    #[test]
    fn test_embedded_media_is_verbatim() {
        let bytes = write_deck(&sample_deck(), Cursor::new(Vec::new())).unwrap().into_inner();
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut media = Vec::new();
        archive
            .by_name("ppt/media/image1.png")
            .unwrap()
            .read_to_end(&mut media)
            .unwrap();
        assert_eq!(media, PNG_MAGIC);
    }

    #[test]
    fn test_webp_crop_keeps_its_media_type() {
        let webp = b"RIFF\x1a\0\0\0WEBPVP8 \x0e\0\0\0".to_vec();
        let deck = Deck::new(
            DEFAULT_TITLE,
            vec![Slide {
                label: "Slide 1".into(),
                image: Some(SlideImage::from_bytes(webp.clone())),
            }],
        );
        let bytes = write_deck(&deck, Cursor::new(Vec::new())).unwrap().into_inner();
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();

        let types = read_part(&mut archive, "[Content_Types].xml");
        assert!(types.contains(r#"Extension="webp" ContentType="image/webp""#));
        let rels = read_part(&mut archive, "ppt/slides/_rels/slide2.xml.rels");
        assert!(rels.contains("../media/image1.webp"));
        let mut media = Vec::new();
        archive
            .by_name("ppt/media/image1.webp")
            .unwrap()
            .read_to_end(&mut media)
            .unwrap();
        assert_eq!(media, webp);
    }

    #[test]
    fn test_text_is_escaped() {
        let deck = Deck::new("Tom & Jerry <3", Vec::new());
        let bytes = write_deck(&deck, Cursor::new(Vec::new())).unwrap().into_inner();
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let title = read_part(&mut archive, "ppt/slides/slide1.xml");
        assert!(title.contains("Tom &amp; Jerry &lt;3"));
    }
}
