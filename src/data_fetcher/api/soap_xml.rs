//! Record extraction from KSÍ SOAP responses.
//!
//! The service answers with flat arrays (`ArrayMotLeikir` of `MotLeikur`,
//! `ArrayMotStada` of `MotStada`, ...) whose items only carry text leaves.
//! [`collect_records`] walks the tags of a response, tracks element depth
//! and turns every item directly under the requested array into a
//! `name -> text` map.

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

static TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?s)<!--.*?-->|<\?.*?\?>|<!DOCTYPE[^>]*>|<!\[CDATA\[(?P<cdata>.*?)\]\]>|<(?P<close>/)?(?:[\w.-]+:)?(?P<name>[\w.-]+)(?P<attrs>(?:\s+[^>]*?)?)(?P<empty>/)?>"#,
    )
    .expect("token pattern is valid")
});

static NIL_ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:^|\s)(?:[\w.-]+:)?nil\s*=\s*["'](?:true|1)["']"#)
        .expect("nil pattern is valid")
});

static NUMERIC_ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&#(x[0-9a-fA-F]+|[0-9]+);").expect("entity pattern is valid")
});

/// One flattened record: leaf element name (prefix dropped) to trimmed text.
pub type Fields = HashMap<String, String>;

#[derive(Debug)]
struct Leaf<'a> {
    name: &'a str,
    text: String,
    nil: bool,
    nested: bool,
}

#[derive(Debug)]
struct OpenRecord<'a> {
    depth: usize,
    fields: Fields,
    leaf: Option<Leaf<'a>>,
}

/// Items named `record` whose parent element is `array`.
///
/// Returns `None` when no `array` element occurs at all. Namespace
/// prefixes are ignored on every tag. Inside an item only direct children
/// without child elements become fields. Empty, self-closing and
/// `xsi:nil` children are left out. CDATA is kept verbatim, other text
/// has its entities decoded.
pub fn collect_records(xml: &str, array: &str, record: &str) -> Option<Vec<Fields>> {
    let mut stack: Vec<&str> = Vec::new();
    let mut records = Vec::new();
    let mut current: Option<OpenRecord> = None;
    let mut saw_array = false;
    let mut last_end = 0;

    for caps in TOKEN.captures_iter(xml) {
        let Some(token) = caps.get(0) else { continue };
        let text = &xml[last_end..token.start()];
        last_end = token.end();

        if let Some(leaf) = current.as_mut().and_then(|r| r.leaf.as_mut())
            && !leaf.nested
        {
            leaf.text.push_str(&decode_entities(text));
            if let Some(cdata) = caps.name("cdata") {
                leaf.text.push_str(cdata.as_str());
            }
        }

        let Some(name) = caps.name("name").map(|m| m.as_str()) else {
            continue;
        };
        let closing = caps.name("close").is_some();
        let self_closing = caps.name("empty").is_some();
        let attrs = caps.name("attrs").map(|m| m.as_str()).unwrap_or_default();

        if closing {
            if let Some(open) = current.as_mut() {
                if stack.len() == open.depth + 1 {
                    if let Some(leaf) = open.leaf.take()
                        && leaf.name == name
                        && !leaf.nil
                        && !leaf.nested
                    {
                        let value = leaf.text.trim();
                        if !value.is_empty() {
                            open.fields.insert(name.to_string(), value.to_string());
                        }
                    }
                } else if stack.len() == open.depth && name == record {
                    if let Some(done) = current.take() {
                        records.push(done.fields);
                    }
                }
            }
            stack.pop();
            continue;
        }

        if name == array {
            saw_array = true;
        }
        let under_array = stack.last().is_some_and(|parent| *parent == array);

        if self_closing {
            if current.is_none() && name == record && under_array {
                records.push(Fields::new());
            } else if let Some(leaf) = current.as_mut().and_then(|r| r.leaf.as_mut()) {
                leaf.nested = true;
            }
            continue;
        }

        stack.push(name);
        match current.as_mut() {
            None if name == record && under_array => {
                current = Some(OpenRecord {
                    depth: stack.len(),
                    fields: Fields::new(),
                    leaf: None,
                });
            }
            Some(open) if stack.len() == open.depth + 1 => {
                open.leaf = Some(Leaf {
                    name,
                    text: String::new(),
                    nil: NIL_ATTRIBUTE.is_match(attrs),
                    nested: false,
                });
            }
            Some(open) => {
                if let Some(leaf) = open.leaf.as_mut() {
                    leaf.nested = true;
                }
            }
            None => {}
        }
    }

    saw_array.then_some(records)
}

/// `faultstring` of a SOAP fault, if the response is one.
pub fn fault_message(xml: &str) -> Option<String> {
    let faults = collect_records(xml, "Body", "Fault")?;
    let fault = faults.into_iter().next()?;
    Some(
        fault
            .get("faultstring")
            .cloned()
            .unwrap_or_else(|| "SOAP fault without faultstring".to_string()),
    )
}

/// Decodes the five predefined XML entities and numeric character references.
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let numeric = NUMERIC_ENTITY.replace_all(text, |caps: &regex::Captures| {
        let reference = &caps[1];
        let code = match reference.strip_prefix('x') {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => reference.parse::<u32>().ok(),
        };
        code.and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_else(|| caps[0].to_string())
    });

    numeric
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field<'a>(fields: &'a Fields, name: &str) -> Option<&'a str> {
        fields.get(name).map(String::as_str)
    }

    #[test]
    fn test_prefixes_are_ignored() {
        let xml = "<m:ArrayMotLeikir><m:MotLeikur><m:LeikurNumer>7</m:LeikurNumer>\
                   </m:MotLeikur></m:ArrayMotLeikir>";
        let records = collect_records(xml, "ArrayMotLeikir", "MotLeikur").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(field(&records[0], "LeikurNumer"), Some("7"));
    }

    #[test]
    fn test_missing_array_is_none() {
        assert!(collect_records("<Body><Other/></Body>", "ArrayMotLeikir", "MotLeikur").is_none());
        let empty = collect_records("<ArrayMotLeikir/>", "ArrayMotLeikir", "MotLeikur").unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_nested_elements_do_not_leak_into_fields() {
        let xml = r#"<ArrayMotLeikir>
              <MotLeikur>
                <LeikurNumer>1</LeikurNumer>
                <Dommari><Nafn>Jón</Nafn><Numer>5</Numer></Dommari>
                <Vollur><VollurNafn>Inni</VollurNafn></Vollur>
                <Nafn>Leikur</Nafn>
              </MotLeikur>
            </ArrayMotLeikir>"#;
        let records = collect_records(xml, "ArrayMotLeikir", "MotLeikur").unwrap();
        let fields = &records[0];
        assert_eq!(field(fields, "LeikurNumer"), Some("1"));
        assert_eq!(field(fields, "Nafn"), Some("Leikur"));
        assert!(!fields.contains_key("Numer"));
        assert!(!fields.contains_key("Dommari"));
        assert!(!fields.contains_key("VollurNafn"));
    }

    #[test]
    fn test_items_outside_the_array_are_ignored() {
        let xml = "<Svar><MotLeikur><LeikurNumer>9</LeikurNumer></MotLeikur>\
                   <ArrayMotLeikir><MotLeikur><LeikurNumer>1</LeikurNumer></MotLeikur>\
                   </ArrayMotLeikir></Svar>";
        let records = collect_records(xml, "ArrayMotLeikir", "MotLeikur").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(field(&records[0], "LeikurNumer"), Some("1"));
    }

    #[test]
    fn test_nil_empty_and_self_closing_leaves_are_absent() {
        let xml = r#"<ArrayMotLeikir><MotLeikur>
              <UrslitHeima xsi:nil="true"></UrslitHeima>
              <UrslitUti xsi:nil='1' />
              <VollurNafn>   </VollurNafn>
              <LeikDagur/>
              <LeikurNumer>3</LeikurNumer>
            </MotLeikur><MotLeikur/></ArrayMotLeikir>"#;
        let records = collect_records(xml, "ArrayMotLeikir", "MotLeikur").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].len(), 1);
        assert_eq!(field(&records[0], "LeikurNumer"), Some("3"));
        assert!(records[1].is_empty());
    }

    #[test]
    fn test_cdata_comments_and_entities() {
        let xml = "<?xml version=\"1.0\"?><ArrayMotLeikir><MotLeikur>\
                   <!-- <LeikurNumer>0</LeikurNumer> -->\
                   <FelagHeimaNafn><![CDATA[KR & <Valur>]]></FelagHeimaNafn>\
                   <FelagUtiNafn>Fram &amp; &#205;R</FelagUtiNafn>\
                   </MotLeikur></ArrayMotLeikir>";
        let records = collect_records(xml, "ArrayMotLeikir", "MotLeikur").unwrap();
        let fields = &records[0];
        assert!(!fields.contains_key("LeikurNumer"));
        assert_eq!(field(fields, "FelagHeimaNafn"), Some("KR & <Valur>"));
        assert_eq!(field(fields, "FelagUtiNafn"), Some("Fram & ÍR"));
    }

    #[test]
    fn test_mismatched_close_drops_the_leaf() {
        let xml = "<ArrayMotLeikir><MotLeikur><X>1</Y><LeikurNumer>2</LeikurNumer>\
                   </MotLeikur></ArrayMotLeikir>";
        let records = collect_records(xml, "ArrayMotLeikir", "MotLeikur").unwrap();
        assert!(!records[0].contains_key("X"));
        assert_eq!(field(&records[0], "LeikurNumer"), Some("2"));
    }

    #[test]
    fn test_fault_message() {
        let xml = "<soap:Envelope><soap:Body><soap:Fault><faultcode>soap:Server</faultcode>\
                   <faultstring>Mót fannst ekki</faultstring></soap:Fault></soap:Body></soap:Envelope>";
        assert_eq!(fault_message(xml).as_deref(), Some("Mót fannst ekki"));

        let bare = "<soap:Envelope><soap:Body><soap:Fault/></soap:Body></soap:Envelope>";
        assert_eq!(
            fault_message(bare).as_deref(),
            Some("SOAP fault without faultstring")
        );

        let ok = "<soap:Envelope><soap:Body><MotLeikirResponse/></soap:Body></soap:Envelope>";
        assert_eq!(fault_message(ok), None);
    }

    #[test]
    fn test_decode_entities() {
        assert_eq!(decode_entities("a &lt;b&gt; &quot;c&quot; &apos;d&apos;"), "a <b> \"c\" 'd'");
        assert_eq!(decode_entities("&amp;lt;"), "&lt;");
        assert_eq!(decode_entities("&#237;&#xF0;"), "íð");
        assert_eq!(decode_entities("plain"), "plain");
    }
}
