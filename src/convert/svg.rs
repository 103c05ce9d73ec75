/// Turns toolkit SVG output into a compact, single-line document that
/// embeds cleanly in HTML and plotting front ends.
///
/// Namespace prefixes (`svg:`) are dropped, a leading XML declaration line is
/// removed, the prefixed namespace declaration becomes the default one and
/// all whitespace runs collapse to a single space.
pub fn normalize_svg(raw: &str) -> String {
    let unprefixed = raw.replace("svg:", "");
    let body = match unprefixed.split_once('\n') {
        Some((first, rest)) if first.trim_start().starts_with("<?xml") => rest,
        _ => unprefixed.as_str(),
    };
    let body = body.replace("xmlns:svg=", "xmlns=");
    body.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const PREFIXED: &str = "<?xml version='1.0' encoding='iso-8859-1'?>\n\
<svg:svg version='1.1' baseProfile='full'\n              xmlns:svg='http://www.w3.org/2000/svg'\n\
              xml:space='preserve'\n\
width='200px' height='200px' viewBox='0 0 200 200'>\n\
<svg:rect style='opacity:1.0;fill:#FFFFFF' width='200' height='200' x='0' y='0'> </svg:rect>\n\
<svg:path d='M 10,10 L 20,20'\tstyle='fill:none' />\n\
</svg:svg>\n";

    #[test]
    fn rdkit_style_svg_is_flattened() {
        let svg = normalize_svg(PREFIXED);
        assert!(svg.starts_with("<svg version='1.1'"));
        assert!(!svg.contains("svg:"));
        assert!(!svg.contains("<?xml"));
        assert!(svg.contains("xmlns='http://www.w3.org/2000/svg'"));
        assert!(!svg.contains('\n'));
        assert!(!svg.contains("  "));
        assert!(svg.ends_with("</svg>"));
    }

    #[test]
    fn unprefixed_svg_keeps_its_namespace() {
        let raw = "<?xml version='1.0'?>\n<svg xmlns='http://www.w3.org/2000/svg'>\n  <path d='M 0,0'/>\n</svg>\n";
        assert_eq!(
            normalize_svg(raw),
            "<svg xmlns='http://www.w3.org/2000/svg'> <path d='M 0,0'/> </svg>"
        );
    }

    #[test]
    fn svg_without_declaration_is_kept_whole() {
        assert_eq!(normalize_svg("<svg>\n</svg>"), "<svg> </svg>");
    }
}
