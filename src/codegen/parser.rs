//! Template source scanner.
//!
//! Recognized structure:
//!
//! ```text
//! @import java.time.LocalDate          ← header: imports and parameters
//! @param String title                  ← jte:  @param Type name [= default]
//! @param count: Int = 1                ← kte:  @param name: Type [= default]
//!
//! <h1>${title}</h1>                    ← output expression
//! !{var year = LocalDate.now();}       ← statement
//! <%-- ignored --%>                    ← comment
//! @tag.nav(active = "home")            ← tag call
//! @layout.main(content = body)         ← layout call
//! ```
//!
//! Everything else is literal text.

use regex::Regex;
use std::sync::LazyLock;

use super::{CallArg, UnitGenerator};
use crate::core::{CompileError, Dialect, ParamInfo, Result, TemplateType};

static IMPORT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@import\s+(.+?)\s*;?$").unwrap());

static JTE_PARAM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^@param\s+(.+?)\s+([A-Za-z_]\w*)\s*(?:=\s*(.+?))?\s*;?$").unwrap()
});

static KTE_PARAM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^@param\s+([A-Za-z_]\w*)\s*:\s*(.+?)\s*(?:=\s*(.+?))?\s*$").unwrap()
});

static NAMED_ARG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^([A-Za-z_]\w*)\s*=\s*([^=\s].*)$").unwrap());

/// Scans one template source and reports its structure to a generator.
pub struct TemplateParser<'a> {
    name: &'a str,
    source: &'a str,
    dialect: Dialect,
}

impl<'a> TemplateParser<'a> {
    pub fn new(name: &'a str, source: &'a str, dialect: Dialect) -> Self {
        Self {
            name,
            source,
            dialect,
        }
    }

    pub fn parse(&self, generator: &mut dyn UnitGenerator) -> Result<()> {
        let (offset, line) = self.parse_header(generator)?;
        generator.on_params_complete();
        self.parse_body(&self.source[offset..], line, generator)?;
        generator.on_complete();
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Header
    // ------------------------------------------------------------------------

    /// Returns byte offset and line number where the body starts.
    fn parse_header(&self, generator: &mut dyn UnitGenerator) -> Result<(usize, usize)> {
        let mut offset = 0;
        let mut line = 1;

        for raw in self.source.split_inclusive('\n') {
            let trimmed = raw.trim();

            if trimmed.is_empty() {
                // blank header lines are dropped
            } else if trimmed.starts_with("@import") {
                let caps = IMPORT
                    .captures(trimmed)
                    .ok_or_else(|| self.error(line, format!("invalid import `{trimmed}`")))?;
                generator.on_import(&caps[1]);
            } else if trimmed.starts_with("@param") {
                let param = self.parse_param(trimmed).ok_or_else(|| {
                    self.error(line, format!("invalid parameter declaration `{trimmed}`"))
                })?;
                generator.on_param(param);
            } else {
                break;
            }

            offset += raw.len();
            line += 1;
        }

        Ok((offset, line))
    }

    fn parse_param(&self, declaration: &str) -> Option<ParamInfo> {
        let (name, type_name, default) = match self.dialect {
            Dialect::Jte => {
                let caps = JTE_PARAM.captures(declaration)?;
                (caps.get(2)?, caps.get(1)?, caps.get(3))
            }
            Dialect::Kte => {
                let caps = KTE_PARAM.captures(declaration)?;
                (caps.get(1)?, caps.get(2)?, caps.get(3))
            }
        };

        Some(ParamInfo {
            name: name.as_str().to_string(),
            type_name: type_name.as_str().trim().to_string(),
            default: default.map(|d| d.as_str().trim().to_string()),
        })
    }

    // ------------------------------------------------------------------------
    // Body
    // ------------------------------------------------------------------------

    fn parse_body(
        &self,
        body: &str,
        mut line: usize,
        generator: &mut dyn UnitGenerator,
    ) -> Result<()> {
        let bytes = body.as_bytes();
        let mut text_start = 0;
        let mut i = 0;

        macro_rules! flush_text {
            ($end:expr) => {
                if text_start < $end {
                    generator.on_text(&body[text_start..$end]);
                }
            };
        }

        while i < bytes.len() {
            // Only slice at ASCII markers, which are always char boundaries
            if !matches!(bytes[i], b'<' | b'$' | b'!' | b'@') {
                if bytes[i] == b'\n' {
                    line += 1;
                }
                i += 1;
                continue;
            }

            let rest = &body[i..];

            if let Some(comment) = rest.strip_prefix("<%--") {
                flush_text!(i);
                let end = comment
                    .find("--%>")
                    .ok_or_else(|| self.error(line, "unterminated comment"))?;
                line += count_lines(&comment[..end]);
                i += 4 + end + 4;
                text_start = i;
                continue;
            }

            if rest.starts_with("${") || rest.starts_with("!{") {
                flush_text!(i);
                let (inner, consumed) = read_delimited(&rest[2..], b'{', b'}')
                    .ok_or_else(|| self.error(line, "unterminated expression"))?;
                let code = inner.trim();
                if rest.starts_with('$') {
                    generator.on_output(code, line);
                } else {
                    generator.on_statement(code, line);
                }
                line += count_lines(inner);
                i += 2 + consumed;
                text_start = i;
                continue;
            }

            if let Some((role, prefix_len)) = call_prefix(rest)
                && let Some((simple_name, args, consumed)) =
                    self.read_call(&rest[prefix_len..], line)?
            {
                flush_text!(i);
                generator.on_call(role, simple_name, args, line)?;
                line += count_lines(&rest[..prefix_len + consumed]);
                i += prefix_len + consumed;
                text_start = i;
                continue;
            }

            i += 1;
        }

        flush_text!(bytes.len());
        Ok(())
    }

    /// Read `name(args)` after a call prefix.
    ///
    /// Returns `None` if the text is not a call (treated as literal text).
    fn read_call<'s>(
        &self,
        s: &'s str,
        line: usize,
    ) -> Result<Option<(&'s str, Vec<CallArg>, usize)>> {
        let name_len = s
            .bytes()
            .take_while(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'.' | b'-'))
            .count();
        let name = &s[..name_len];

        if name.is_empty() || name.ends_with('.') || s.as_bytes().get(name_len) != Some(&b'(') {
            return Ok(None);
        }

        let (inner, consumed) = read_delimited(&s[name_len + 1..], b'(', b')')
            .ok_or_else(|| self.error(line, format!("unterminated call to `{name}`")))?;

        Ok(Some((name, split_args(inner), name_len + 1 + consumed)))
    }

    fn error(&self, line: usize, message: impl Into<String>) -> CompileError {
        CompileError::parse(self.name, line, message)
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn call_prefix(s: &str) -> Option<(TemplateType, usize)> {
    if s.starts_with("@tag.") {
        Some((TemplateType::Tag, "@tag.".len()))
    } else if s.starts_with("@layout.") {
        Some((TemplateType::Layout, "@layout.".len()))
    } else {
        None
    }
}

fn count_lines(s: &str) -> usize {
    s.bytes().filter(|b| *b == b'\n').count()
}

/// Find the `close` matching an already consumed `open`, skipping quoted text.
///
/// Returns the enclosed text and the number of bytes consumed including `close`.
fn read_delimited(s: &str, open: u8, close: u8) -> Option<(&str, usize)> {
    let bytes = s.as_bytes();
    let mut depth = 1usize;
    let mut quote: Option<u8> = None;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(q) => {
                if b == b'\\' {
                    i += 1;
                } else if b == q {
                    quote = None;
                }
            }
            None => {
                if b == b'"' || b == b'\'' {
                    quote = Some(b);
                } else if b == open {
                    depth += 1;
                } else if b == close {
                    depth -= 1;
                    if depth == 0 {
                        return Some((&s[..i], i + 1));
                    }
                }
            }
        }
        i += 1;
    }

    None
}

/// Split call arguments at top-level commas.
fn split_args(s: &str) -> Vec<CallArg> {
    let bytes = s.as_bytes();
    let mut args = Vec::new();
    let mut depth = 0i32;
    let mut quote: Option<u8> = None;
    let mut start = 0;
    let mut i = 0;

    let mut push = |raw: &str| {
        let raw = raw.trim();
        if raw.is_empty() {
            return;
        }
        let arg = match NAMED_ARG.captures(raw) {
            Some(caps) => CallArg::named(&caps[1], caps[2].trim()),
            None => CallArg::positional(raw),
        };
        args.push(arg);
    };

    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(q) => {
                if b == b'\\' {
                    i += 1;
                } else if b == q {
                    quote = None;
                }
            }
            None => match b {
                b'"' | b'\'' => quote = Some(b),
                b'(' | b'[' | b'{' => depth += 1,
                b')' | b']' | b'}' => depth -= 1,
                b',' if depth == 0 => {
                    push(&s[start..i]);
                    start = i + 1;
                }
                _ => {}
            },
        }
        i += 1;
    }
    push(&s[start..]);

    args
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::GeneratedCode;

    /// Records parser events as readable strings.
    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl UnitGenerator for Recorder {
        fn on_import(&mut self, import: &str) {
            self.events.push(format!("import {import}"));
        }
        fn on_param(&mut self, param: ParamInfo) {
            self.events.push(format!(
                "param {}: {}{}",
                param.name,
                param.type_name,
                param.default.map(|d| format!(" = {d}")).unwrap_or_default()
            ));
        }
        fn on_params_complete(&mut self) {
            self.events.push("params complete".into());
        }
        fn on_text(&mut self, text: &str) {
            self.events.push(format!("text {text:?}"));
        }
        fn on_output(&mut self, expression: &str, line: usize) {
            self.events.push(format!("output {expression} @{line}"));
        }
        fn on_statement(&mut self, statement: &str, line: usize) {
            self.events.push(format!("statement {statement} @{line}"));
        }
        fn on_call(
            &mut self,
            role: TemplateType,
            simple_name: &str,
            args: Vec<CallArg>,
            line: usize,
        ) -> Result<()> {
            let args: Vec<_> = args
                .iter()
                .map(|a| match &a.name {
                    Some(name) => format!("{name}={}", a.value),
                    None => a.value.clone(),
                })
                .collect();
            self.events.push(format!(
                "call {} {simple_name}({}) @{line}",
                role.name(),
                args.join("; ")
            ));
            Ok(())
        }
        fn on_complete(&mut self) {
            self.events.push("complete".into());
        }
        fn take_code(&mut self) -> GeneratedCode {
            GeneratedCode::default()
        }
    }

    fn parse(source: &str, dialect: Dialect) -> Vec<String> {
        let mut recorder = Recorder::default();
        TemplateParser::new("test.jte", source, dialect)
            .parse(&mut recorder)
            .unwrap();
        recorder.events
    }

    #[test]
    fn test_header() {
        let events = parse(
            "@import java.time.LocalDate\n\n@param String title\n@param int count = 1\n<p>",
            Dialect::Jte,
        );
        assert_eq!(
            events,
            vec![
                "import java.time.LocalDate",
                "param title: String",
                "param count: int = 1",
                "params complete",
                "text \"<p>\"",
                "complete",
            ]
        );
    }

    #[test]
    fn test_generic_param_type() {
        let events = parse("@param java.util.Map<String, Object> items\n", Dialect::Jte);
        assert_eq!(events[0], "param items: java.util.Map<String, Object>");
    }

    #[test]
    fn test_kotlin_params() {
        let events = parse(
            "@param title: String\n@param tags: List<String> = emptyList()\nx",
            Dialect::Kte,
        );
        assert_eq!(events[0], "param title: String");
        assert_eq!(events[1], "param tags: List<String> = emptyList()");
    }

    #[test]
    fn test_body_events_and_lines() {
        let events = parse(
            "@param String name\n<h1>${name}</h1>\n!{var x = 1;}\n<%-- hidden\n--%>${x}",
            Dialect::Jte,
        );
        assert_eq!(
            events,
            vec![
                "param name: String",
                "params complete",
                "text \"<h1>\"",
                "output name @2",
                "text \"</h1>\\n\"",
                "statement var x = 1; @3",
                "text \"\\n\"",
                "output x @5",
                "complete",
            ]
        );
    }

    #[test]
    fn test_nested_braces_and_strings() {
        let events = parse("${map.get(\"}\").size() + f({a})}", Dialect::Jte);
        assert_eq!(events[1], "output map.get(\"}\").size() + f({a}) @1");
    }

    #[test]
    fn test_calls() {
        let events = parse(
            "<nav>@tag.forms.input(user.name(), label = \"a, b\", x == y)</nav>\n@layout.main(content = f(1, 2))",
            Dialect::Jte,
        );
        assert_eq!(
            events,
            vec![
                "params complete",
                "text \"<nav>\"",
                "call tag forms.input(user.name(); label=\"a, b\"; x == y) @1",
                "text \"</nav>\\n\"",
                "call layout main(content=f(1, 2)) @2",
                "complete",
            ]
        );
    }

    #[test]
    fn test_non_call_at_sign_is_text() {
        let events = parse("mail me @ home, @tag.nav without parens", Dialect::Jte);
        assert_eq!(
            events,
            vec![
                "params complete",
                "text \"mail me @ home, @tag.nav without parens\"",
                "complete",
            ]
        );
    }

    #[test]
    fn test_multibyte_text() {
        let events = parse("héllo ${name} wörld", Dialect::Jte);
        assert_eq!(events[1], "text \"héllo \"");
        assert_eq!(events[3], "text \" wörld\"");
    }

    #[test]
    fn test_unterminated_expression() {
        let mut recorder = Recorder::default();
        let err = TemplateParser::new("page.jte", "a\nb ${oops", Dialect::Jte)
            .parse(&mut recorder)
            .unwrap_err();
        match err {
            CompileError::Parse { name, line, .. } => {
                assert_eq!(name, "page.jte");
                assert_eq!(line, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_param() {
        let mut recorder = Recorder::default();
        let err = TemplateParser::new("page.jte", "@param\n", Dialect::Jte)
            .parse(&mut recorder)
            .unwrap_err();
        assert!(matches!(err, CompileError::Parse { line: 1, .. }));
    }
}
