//! Built-in unit generator for `jte` (Java) and `kte` (Kotlin) templates.

use indexmap::IndexMap;
use std::mem;

use super::syntax::Syntax;
use super::{CallArg, GeneratedCode, GenerationHost, UnitGenerator};
use crate::core::{ClassInfo, CompileError, DebugInfo, ParamInfo, Result, TemplateType};

/// Generates one unit from parser events.
///
/// Tag and layout calls are resolved through the host before the call site
/// is emitted, so the callee's parameter order is known by then.
pub struct SourceGenerator<H> {
    info: ClassInfo,
    host: H,
    syntax: Syntax,
    imports: Vec<String>,
    params: Vec<ParamInfo>,
    body: String,
    binary_parts: Vec<Vec<u8>>,
    code: String,
}

impl<H: GenerationHost> SourceGenerator<H> {
    pub fn new(info: ClassInfo, host: H) -> Self {
        let syntax = Syntax::new(info.dialect);
        Self {
            info,
            host,
            syntax,
            imports: Vec::new(),
            params: Vec::new(),
            body: String::new(),
            binary_parts: Vec::new(),
            code: String::new(),
        }
    }

    fn push_line(&mut self, line: &str) {
        self.body.push_str("\t\t");
        self.body.push_str(line);
        self.body.push('\n');
    }

    /// Emit `line` followed by a source location comment.
    fn push_located(&mut self, line: &str, source_line: usize) {
        let located = format!("{line} // {}", DebugInfo::new(&self.info.name, source_line));
        self.push_line(&located);
    }
}

impl<H: GenerationHost> UnitGenerator for SourceGenerator<H> {
    fn on_import(&mut self, import: &str) {
        self.imports.push(import.to_string());
    }

    fn on_param(&mut self, param: ParamInfo) {
        self.params.push(param);
    }

    fn on_params_complete(&mut self) {
        let params = self.params.clone();
        self.host.record_param_order(&self.info.name, params);
    }

    fn on_text(&mut self, text: &str) {
        let t = self.syntax.terminator();
        if self.host.options().binary_static_content {
            let index = self.binary_parts.len();
            self.binary_parts.push(text.as_bytes().to_vec());
            self.push_line(&format!("output.writeBinaryContent(BINARY.get({index})){t}"));
        } else {
            let literal = self.syntax.string_literal(text);
            self.push_line(&format!("output.writeContent({literal}){t}"));
        }
    }

    fn on_output(&mut self, expression: &str, line: usize) {
        let t = self.syntax.terminator();
        self.push_located(&format!("output.writeUserContent({expression}){t}"), line);
    }

    fn on_statement(&mut self, statement: &str, line: usize) {
        self.push_located(statement, line);
    }

    fn on_call(
        &mut self,
        role: TemplateType,
        simple_name: &str,
        args: Vec<CallArg>,
        line: usize,
    ) -> Result<()> {
        let origin = DebugInfo::new(&self.info.name, line);
        let extension = self.info.dialect.extension();
        let callee = self
            .host
            .generate_call(role, simple_name, extension, origin)?;

        let params = self.host.param_order(&callee.name);
        let values = order_arguments(&callee.name, params.as_deref(), args)
            .map_err(|message| CompileError::parse(&self.info.name, line, message))?;

        let t = self.syntax.terminator();
        let args: String = values.iter().map(|v| format!(", {v}")).collect();
        self.push_located(&format!("{}.render(output{args}){t}", callee.full_name), line);
        Ok(())
    }

    fn on_complete(&mut self) {
        let lengths: Vec<usize> = self.binary_parts.iter().map(Vec::len).collect();
        let options = self.host.options();

        let mut code = self.syntax.open_class(
            &self.info,
            &self.imports,
            &self.params,
            &options.runtime_package,
            &lengths,
        );
        code.push_str(&self.body);
        code.push_str(self.syntax.close_class());
        self.code = code;
    }

    fn take_code(&mut self) -> GeneratedCode {
        GeneratedCode {
            code: mem::take(&mut self.code),
            binary_text_parts: mem::take(&mut self.binary_parts),
        }
    }
}

/// Arrange call arguments in the callee's declared parameter order.
///
/// Positional arguments fill parameters from the left; the rest are taken
/// from named arguments or declared defaults. Without a known parameter list
/// only positional arguments are accepted and passed through unchanged.
fn order_arguments(
    callee: &str,
    params: Option<&[ParamInfo]>,
    args: Vec<CallArg>,
) -> std::result::Result<Vec<String>, String> {
    let Some(params) = params else {
        if let Some(name) = args.iter().find_map(|a| a.name.as_deref()) {
            return Err(format!(
                "cannot pass `{name}` by name, parameters of {callee} are unknown"
            ));
        }
        return Ok(args.into_iter().map(|a| a.value).collect());
    };

    let mut positional = Vec::new();
    let mut named: IndexMap<String, String> = IndexMap::new();

    for arg in args {
        match arg.name {
            Some(name) => {
                let Some(index) = params.iter().position(|p| p.name == name) else {
                    return Err(format!("{callee} has no parameter `{name}`"));
                };
                if index < positional.len() || named.contains_key(&name) {
                    return Err(format!("parameter `{name}` of {callee} is given twice"));
                }
                named.insert(name, arg.value);
            }
            None if !named.is_empty() => {
                return Err(format!(
                    "positional argument `{}` follows named arguments",
                    arg.value
                ));
            }
            None => positional.push(arg.value),
        }
    }

    if positional.len() > params.len() {
        return Err(format!(
            "{callee} takes {} arguments but {} were given",
            params.len(),
            positional.len()
        ));
    }

    let mut positional = positional.into_iter();
    params
        .iter()
        .map(|param| {
            if let Some(value) = positional.next() {
                return Ok(value);
            }
            named
                .shift_remove(&param.name)
                .or_else(|| param.default.clone())
                .ok_or_else(|| format!("missing argument `{}` for {callee}", param.name))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::{GeneratorOptions, TemplateParser};
    use rustc_hash::FxHashMap;

    /// Host that resolves every call without generating anything.
    #[derive(Default)]
    struct StubHost {
        options: GeneratorOptions,
        params: FxHashMap<String, Vec<ParamInfo>>,
        calls: Vec<String>,
    }

    impl GenerationHost for &mut StubHost {
        fn generate_call(
            &mut self,
            role: TemplateType,
            simple_name: &str,
            extension: &str,
            origin: DebugInfo,
        ) -> Result<ClassInfo> {
            let name = role.resolve_name(simple_name, extension);
            self.calls.push(format!("{name} from {origin}"));
            Ok(ClassInfo::new(&name, "app"))
        }

        fn param_order(&self, name: &str) -> Option<Vec<ParamInfo>> {
            self.params.get(name).cloned()
        }

        fn record_param_order(&mut self, name: &str, params: Vec<ParamInfo>) {
            self.params.insert(name.to_string(), params);
        }

        fn options(&self) -> &GeneratorOptions {
            &self.options
        }
    }

    fn param(name: &str, default: Option<&str>) -> ParamInfo {
        ParamInfo {
            name: name.into(),
            type_name: "String".into(),
            default: default.map(String::from),
        }
    }

    fn generate(name: &str, source: &str, host: &mut StubHost) -> Result<GeneratedCode> {
        let info = ClassInfo::new(name, "app");
        let mut generator = SourceGenerator::new(info.clone(), host);
        TemplateParser::new(name, source, info.dialect).parse(&mut generator)?;
        Ok(generator.take_code())
    }

    #[test]
    fn test_java_unit() {
        let mut host = StubHost::default();
        let code = generate(
            "page.jte",
            "@param String title\n<h1>${title}</h1>",
            &mut host,
        )
        .unwrap();

        assert_eq!(
            code.code,
            "package app;\n\n\
             public final class JtepageGenerated {\n\
             \tpublic static final String NAME = \"page.jte\";\n\
             \tpublic static void render(gg.stencil.runtime.TemplateOutput output, String title) {\n\
             \t\toutput.writeContent(\"<h1>\");\n\
             \t\toutput.writeUserContent(title); // page.jte:2\n\
             \t\toutput.writeContent(\"</h1>\");\n\
             \t}\n\
             }\n"
        );
        assert!(code.binary_text_parts.is_empty());
        assert_eq!(host.params["page.jte"], vec![param("title", None)]);
    }

    #[test]
    fn test_kotlin_unit() {
        let mut host = StubHost::default();
        let code = generate("tag/nav.kte", "@param active: String\n${active}", &mut host).unwrap();

        assert!(code.code.starts_with("package app.tag\n\nobject KtenavGenerated {\n"));
        assert!(code.code.contains("@JvmStatic fun render(output: gg.stencil.runtime.TemplateOutput, active: String) {"));
        assert!(code.code.contains("\t\toutput.writeUserContent(active) // tag/nav.kte:2\n"));
    }

    #[test]
    fn test_binary_static_content() {
        let mut host = StubHost::default();
        host.options.binary_static_content = true;
        let code = generate("page.jte", "<p>${x}</p>", &mut host).unwrap();

        assert_eq!(code.binary_text_parts, vec![b"<p>".to_vec(), b"</p>".to_vec()]);
        assert!(code.code.contains("BinaryContent.load(JtepageGenerated.class, \"JtepageGenerated.bin\", 3, 4);"));
        assert!(code.code.contains("output.writeBinaryContent(BINARY.get(1));"));
    }

    #[test]
    fn test_call_uses_declared_order() {
        let mut host = StubHost::default();
        host.params.insert(
            "tag/link.jte".into(),
            vec![param("href", None), param("label", None), param("rel", Some("\"nofollow\""))],
        );

        let code = generate(
            "page.jte",
            "@tag.link(label = \"Home\", href = \"/\")",
            &mut host,
        )
        .unwrap();

        assert!(code.code.contains(
            "app.tag.JtelinkGenerated.render(output, \"/\", \"Home\", \"nofollow\"); // page.jte:1"
        ));
        assert_eq!(host.calls, vec!["tag/link.jte from page.jte:1"]);
    }

    #[test]
    fn test_call_errors() {
        let mut host = StubHost::default();
        host.params
            .insert("tag/link.jte".into(), vec![param("href", None)]);

        let err = generate("page.jte", "\n@tag.link(title = 1)", &mut host).unwrap_err();
        assert!(matches!(err, CompileError::Parse { line: 2, .. }));

        let err = generate("page.jte", "@tag.link()", &mut host).unwrap_err();
        assert!(err.to_string().contains("missing argument `href`"));
    }

    #[test]
    fn test_order_arguments() {
        let params = vec![param("a", None), param("b", Some("2"))];

        assert_eq!(
            order_arguments("t", Some(params.as_slice()), vec![CallArg::positional("1")]).unwrap(),
            vec!["1", "2"]
        );
        assert_eq!(
            order_arguments("t", None, vec![CallArg::positional("x")]).unwrap(),
            vec!["x"]
        );
        assert!(order_arguments("t", None, vec![CallArg::named("a", "1")]).is_err());
        assert!(
            order_arguments(
                "t",
                Some(params.as_slice()),
                vec![CallArg::positional("1"), CallArg::named("a", "1")]
            )
            .is_err()
        );
        assert!(
            order_arguments(
                "t",
                Some(params.as_slice()),
                vec![CallArg::named("b", "1"), CallArg::positional("1")]
            )
            .is_err()
        );
    }
}
