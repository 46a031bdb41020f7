//! Declaration and doc-comment extraction from Go sources.
//!
//! Every file is parsed with the tree-sitter Go grammar. One query picks out
//! the top-level `package`, `type`, `func`, `const` and `var` declarations,
//! and the comment nodes directly above a declaration become its doc.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use rustc_hash::FxHashMap;
use tree_sitter::{Node, Parser, Query, QueryCursor, StreamingIterator, Tree};

use crate::error::{DocsError, Result};
use crate::markdown::{Documentation, MarkdownRenderer};
use crate::model::{Declarations, ExampleDoc, FuncDoc, Package, TypeDoc, TypeKind, ValueDoc};

const DECLARATIONS: &str = r#"
(source_file (package_clause) @package)
(source_file (type_declaration) @type)
(source_file (function_declaration) @func)
(source_file (method_declaration) @method)
(source_file (const_declaration) @const)
(source_file (var_declaration) @var)
"#;

static OUTPUT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[[:space:]]*(unordered )?output:").expect("output regex should always compile")
});

/// Populates the declarations of a discovered package.
pub trait PackageAnalyzer: Send + Sync {
    fn analyze(&self, package: &Package) -> Result<Declarations>;
}

/// Parses the `.go` files of a package directory.
///
/// Declarations come from the non-test files. `_test.go` files only
/// contribute `Example*` functions; a test file that does not parse is
/// skipped with a warning.
#[derive(Debug, Clone, Default)]
pub struct GoSourceAnalyzer;

impl PackageAnalyzer for GoSourceAnalyzer {
    #[tracing::instrument(skip_all, fields(package = %package.import_path))]
    fn analyze(&self, package: &Package) -> Result<Declarations> {
        let fail = |message: String| DocsError::analysis(&package.import_path, message);

        let (sources, tests) =
            source_files(&package.dir).map_err(|err| fail(format!("{}: {err}", package.dir.display())))?;
        let mut parser = GoParser::new().map_err(fail)?;

        let mut decls = Declarations::default();
        let mut funcs = Vec::new();
        let mut consts = Vec::new();
        let mut vars = Vec::new();

        for path in &sources {
            let file_name = file_name(path);
            let source = fs::read_to_string(path).map_err(|err| fail(format!("{file_name}: {err}")))?;
            let scanned = parser
                .scan(&source)
                .map_err(|message| fail(format!("{file_name}: {message}")))?;

            if !scanned.package_doc.is_empty() && (decls.doc.is_empty() || file_name == "doc.go") {
                decls.doc = scanned.package_doc;
            }
            if decls.name.is_empty() {
                decls.name = scanned.package_name;
            }
            decls.types.extend(scanned.types);
            funcs.extend(scanned.funcs);
            consts.extend(scanned.consts);
            vars.extend(scanned.vars);
            decls.filenames.push(file_name);
        }

        let mut examples = Vec::new();
        for path in &tests {
            let found = fs::read_to_string(path)
                .map_err(|err| err.to_string())
                .and_then(|source| parser.examples(&source));
            match found {
                Ok(found) => examples.extend(found),
                Err(message) => {
                    tracing::warn!(file = %file_name(path), error = %message, "skipping examples in test file")
                }
            }
        }

        attach_funcs(&mut decls, funcs);
        attach_values(&mut decls, consts, |ty| &mut ty.consts, |d| &mut d.consts);
        attach_values(&mut decls, vars, |ty| &mut ty.vars, |d| &mut d.vars);
        attach_examples(&mut decls, examples);
        tracing::debug!(
            files = decls.filenames.len(),
            types = decls.types.len(),
            funcs = decls.funcs.len(),
            "analyzed package"
        );
        Ok(decls)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Sorted source files and test files of a package directory.
fn source_files(dir: &Path) -> std::io::Result<(Vec<PathBuf>, Vec<PathBuf>)> {
    let mut sources = Vec::new();
    let mut tests = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.extension().is_some_and(|ext| ext == "go") || !path.is_file() {
            continue;
        }
        if file_name(&path).ends_with("_test.go") {
            tests.push(path);
        } else {
            sources.push(path);
        }
    }
    sources.sort();
    tests.sort();
    Ok((sources, tests))
}

/// Convert every doc comment in a package to rendered documentation.
pub fn document_package(package: &mut Package, md: &dyn MarkdownRenderer) {
    package.documentation = Documentation::new(&package.doc, md);
    let decls = &mut package.declarations;
    for value in decls.consts.iter_mut().chain(decls.vars.iter_mut()) {
        value.documentation = Documentation::new(&value.doc, md);
    }
    for ty in &mut decls.types {
        ty.documentation = Documentation::new(&ty.doc, md);
        for value in ty.consts.iter_mut().chain(ty.vars.iter_mut()) {
            value.documentation = Documentation::new(&value.doc, md);
        }
        for func in ty.all_funcs_mut() {
            func.documentation = Documentation::new(&func.doc, md);
        }
    }
    for func in &mut decls.funcs {
        func.documentation = Documentation::new(&func.doc, md);
    }
}

#[derive(Debug, Default)]
struct ScannedFile {
    package_name: String,
    package_doc: String,
    types: Vec<TypeDoc>,
    funcs: Vec<ScannedFunc>,
    consts: Vec<ScannedValue>,
    vars: Vec<ScannedValue>,
}

#[derive(Debug)]
struct ScannedFunc {
    func: FuncDoc,
    recv_base: Option<String>,
    first_result: Option<String>,
}

#[derive(Debug)]
struct ScannedValue {
    value: ValueDoc,
    /// The one type every explicitly typed spec in the group shares.
    type_name: Option<String>,
}

/// A Go parser plus the compiled top-level declaration query.
struct GoParser {
    parser: Parser,
    query: Query,
}

impl GoParser {
    fn new() -> std::result::Result<Self, String> {
        let language: tree_sitter::Language = tree_sitter_go::LANGUAGE.into();
        let mut parser = Parser::new();
        parser
            .set_language(&language)
            .map_err(|err| format!("failed to load the Go grammar: {err}"))?;
        let query =
            Query::new(&language, DECLARATIONS).map_err(|err| format!("invalid declaration query: {err}"))?;
        Ok(Self { parser, query })
    }

    fn parse(&mut self, source: &str) -> std::result::Result<Tree, String> {
        let tree = self
            .parser
            .parse(source, None)
            .ok_or_else(|| "parser produced no syntax tree".to_string())?;
        if let Some(node) = first_error(tree.root_node()) {
            let at = node.start_position();
            return Err(format!("syntax error at line {}, column {}", at.row + 1, at.column + 1));
        }
        Ok(tree)
    }

    /// Top-level declarations with the name of the capture that found them.
    fn top_level<'q, 't>(&'q self, tree: &'t Tree, source: &str) -> Vec<(&'q str, Node<'t>)> {
        let names = self.query.capture_names();
        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(&self.query, tree.root_node(), source.as_bytes());

        let mut found = Vec::new();
        while let Some(m) = matches.next() {
            for capture in m.captures {
                found.push((names[capture.index as usize], capture.node));
            }
        }
        found
    }

    fn scan(&mut self, source: &str) -> std::result::Result<ScannedFile, String> {
        let tree = self.parse(source)?;
        let mut file = ScannedFile::default();

        for (capture, node) in self.top_level(&tree, source) {
            match capture {
                "package" => {
                    if let Some(name) = node.named_child(0) {
                        file.package_name = text(name, source).to_string();
                    }
                    file.package_doc = doc_comment(node, source);
                }
                "type" => file.types.extend(type_specs(node, source)),
                "func" | "method" => file.funcs.extend(scan_func(node, source)),
                "const" => file.consts.push(value_group(node, source)),
                "var" => file.vars.push(value_group(node, source)),
                _ => {}
            }
        }
        Ok(file)
    }

    fn examples(&mut self, source: &str) -> std::result::Result<Vec<ExampleDoc>, String> {
        let tree = self.parse(source)?;
        Ok(self
            .top_level(&tree, source)
            .into_iter()
            .filter(|(capture, _)| *capture == "func")
            .filter_map(|(_, node)| example(node, source))
            .collect())
    }
}

fn text<'s>(node: Node<'_>, source: &'s str) -> &'s str {
    &source[node.byte_range()]
}

fn named_children<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).collect()
}

fn first_error<'t>(node: Node<'t>) -> Option<Node<'t>> {
    if !node.has_error() {
        return None;
    }
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    let children: Vec<_> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error).or(Some(node))
}

/// The comment block directly above `node`: no blank line in between, and
/// no trailing comment belonging to code on the line before.
fn doc_comment(node: Node<'_>, source: &str) -> String {
    // Named siblings only: statement terminators are anonymous `\n` tokens.
    let mut comments = Vec::new();
    let mut next_row = node.start_position().row;
    let mut current = node.prev_named_sibling();

    while let Some(comment) = current {
        if comment.kind() != "comment" || comment.end_position().row + 1 < next_row {
            break;
        }
        if comment
            .prev_named_sibling()
            .is_some_and(|before| before.end_position().row == comment.start_position().row)
        {
            break;
        }
        comments.push(text(comment, source));
        next_row = comment.start_position().row;
        current = comment.prev_named_sibling();
    }

    comments.reverse();
    comment_text(comments)
}

/// Strip comment markers. Compiler directives are not documentation.
fn comment_text<'s>(comments: impl IntoIterator<Item = &'s str>) -> String {
    let mut lines: Vec<&str> = Vec::new();
    for comment in comments {
        match comment.strip_prefix("//") {
            Some(line) if line.starts_with("go:") || line.starts_with("line ") => {}
            Some(line) => lines.push(line.strip_prefix(' ').unwrap_or(line).trim_end()),
            None => {
                let body = comment.trim_start_matches("/*").trim_end_matches("*/");
                lines.extend(body.lines().map(str::trim));
            }
        }
    }
    lines.join("\n").trim().to_string()
}

/// `T`, `*T`, `T[K]` and `*T[K]` name the type `T`.
fn base_type(node: Node<'_>, source: &str) -> Option<String> {
    match node.kind() {
        "type_identifier" => Some(text(node, source).to_string()),
        "pointer_type" => base_type(node.named_child(0)?, source),
        "generic_type" => base_type(node.child_by_field_name("type")?, source),
        _ => None,
    }
}

fn type_kind(node: Option<Node<'_>>) -> TypeKind {
    match node.map(|n| n.kind()) {
        Some("struct_type") => TypeKind::Struct,
        Some("interface_type") => TypeKind::Interface,
        _ => TypeKind::Other,
    }
}

fn type_specs(decl: Node<'_>, source: &str) -> Vec<TypeDoc> {
    let specs: Vec<_> = named_children(decl)
        .into_iter()
        .filter(|n| matches!(n.kind(), "type_spec" | "type_alias"))
        .collect();
    let grouped = decl.child(1).is_some_and(|n| n.kind() == "(");
    let decl_doc = doc_comment(decl, source);

    let mut types = Vec::with_capacity(specs.len());
    for spec in &specs {
        let Some(name) = spec.child_by_field_name("name") else {
            continue;
        };
        let name = text(name, source).to_string();
        let shape = spec.child_by_field_name("type");

        let (doc, decl_text) = if grouped {
            let doc = doc_comment(*spec, source);
            let doc = if doc.is_empty() && specs.len() == 1 {
                decl_doc.clone()
            } else {
                doc
            };
            (doc, format!("type {}", text(*spec, source)))
        } else {
            (decl_doc.clone(), text(decl, source).to_string())
        };

        let kind = type_kind(shape);
        let methods = match shape {
            Some(iface) if kind == TypeKind::Interface => interface_methods(&name, iface, source),
            _ => Vec::new(),
        };
        types.push(TypeDoc {
            name,
            kind,
            doc,
            decl: decl_text,
            methods,
            ..Default::default()
        });
    }
    types
}

fn interface_methods(type_name: &str, iface: Node<'_>, source: &str) -> Vec<FuncDoc> {
    named_children(iface)
        .into_iter()
        .filter(|n| matches!(n.kind(), "method_elem" | "method_spec"))
        .filter_map(|elem| {
            let name = elem.child_by_field_name("name")?;
            Some(FuncDoc {
                name: text(name, source).to_string(),
                recv: Some(type_name.to_string()),
                doc: doc_comment(elem, source),
                signature: text(elem, source).to_string(),
                ..Default::default()
            })
        })
        .collect()
}

/// Declaration text up to the body.
fn signature(node: Node<'_>, source: &str) -> String {
    match node.child_by_field_name("body") {
        Some(body) => source[node.start_byte()..body.start_byte()].trim_end().to_string(),
        None => text(node, source).to_string(),
    }
}

fn first_param_type<'t>(list: Node<'t>) -> Option<Node<'t>> {
    named_children(list)
        .into_iter()
        .find(|n| n.kind() == "parameter_declaration")?
        .child_by_field_name("type")
}

fn scan_func(node: Node<'_>, source: &str) -> Option<ScannedFunc> {
    let name = text(node.child_by_field_name("name")?, source).to_string();
    let receiver = node
        .child_by_field_name("receiver")
        .and_then(first_param_type);

    let first_result = match (receiver, node.child_by_field_name("result")) {
        (None, Some(result)) if result.kind() == "parameter_list" => {
            first_param_type(result).and_then(|ty| base_type(ty, source))
        }
        (None, Some(result)) => base_type(result, source),
        _ => None,
    };

    Some(ScannedFunc {
        func: FuncDoc {
            name,
            recv: receiver.map(|ty| text(ty, source).to_string()),
            doc: doc_comment(node, source),
            signature: signature(node, source),
            ..Default::default()
        },
        recv_base: receiver.and_then(|ty| base_type(ty, source)),
        first_result,
    })
}

fn value_group(decl: Node<'_>, source: &str) -> ScannedValue {
    let mut specs = Vec::new();
    for child in named_children(decl) {
        match child.kind() {
            "const_spec" | "var_spec" => specs.push(child),
            "var_spec_list" => specs.extend(
                named_children(child)
                    .into_iter()
                    .filter(|n| n.kind() == "var_spec"),
            ),
            _ => {}
        }
    }

    let mut names = Vec::new();
    let mut types = Vec::new();
    for spec in &specs {
        let mut cursor = spec.walk();
        names.extend(
            spec.children_by_field_name("name", &mut cursor)
                .map(|n| text(n, source).to_string()),
        );
        if let Some(ty) = spec.child_by_field_name("type") {
            types.push(base_type(ty, source));
        }
    }

    let type_name = match types.split_first() {
        Some((Some(first), rest)) if rest.iter().all(|t| t.as_ref() == Some(first)) => Some(first.clone()),
        _ => None,
    };

    ScannedValue {
        value: ValueDoc {
            names,
            doc: doc_comment(decl, source),
            decl: text(decl, source).to_string(),
            ..Default::default()
        },
        type_name,
    }
}

/// An `Example*` function: no parameters, results or type parameters.
fn example(node: Node<'_>, source: &str) -> Option<ExampleDoc> {
    let name = text(node.child_by_field_name("name")?, source);
    if !name.starts_with("Example")
        || node.child_by_field_name("result").is_some()
        || node.child_by_field_name("type_parameters").is_some()
        || node
            .child_by_field_name("parameters")
            .is_some_and(|params| params.named_child_count() > 0)
    {
        return None;
    }
    let body = node.child_by_field_name("body")?;

    let mut comments = Vec::new();
    collect_comments(body, &mut comments);
    let mut output = None;
    let mut unordered = false;
    let mut code_end = body.end_byte().saturating_sub(1);

    // The trailing comment group may hold the expected output.
    if let Some(last) = comments.len().checked_sub(1) {
        let mut first = last;
        while first > 0 && comments[first - 1].end_position().row + 1 == comments[first].start_position().row {
            first -= 1;
        }
        let group = comment_text(comments[first..].iter().map(|c| text(*c, source)));
        if let Some(caps) = OUTPUT_RE.captures(&group) {
            unordered = caps.get(1).is_some();
            output = Some(group[caps.get(0).map_or(0, |m| m.end())..].trim().to_string());
            code_end = comments[first].start_byte();
        }
    }

    let start = (body.start_byte() + 1).min(code_end);
    Some(ExampleDoc {
        name: name.to_string(),
        doc: doc_comment(node, source),
        code: dedent(&source[start..code_end]),
        output,
        unordered,
        ..Default::default()
    })
}

fn collect_comments<'t>(node: Node<'t>, out: &mut Vec<Node<'t>>) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() == "comment" {
            out.push(child);
        } else {
            collect_comments(child, out);
        }
    }
}

/// Drop surrounding blank lines and one level of tab indentation.
fn dedent(code: &str) -> String {
    let lines: Vec<&str> = code.lines().collect();
    let start = lines.iter().position(|l| !l.trim().is_empty()).unwrap_or(lines.len());
    let end = lines.iter().rposition(|l| !l.trim().is_empty()).map_or(start, |i| i + 1);
    lines[start..end]
        .iter()
        .map(|l| l.strip_prefix('\t').unwrap_or(l).trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Methods go to their receiver type, functions returning a package type
/// become that type's constructors, everything else stays package-level.
fn attach_funcs(decls: &mut Declarations, funcs: Vec<ScannedFunc>) {
    let positions: FxHashMap<String, usize> = decls
        .types
        .iter()
        .enumerate()
        .map(|(i, t)| (t.name.clone(), i))
        .collect();

    for scanned in funcs {
        if let Some(base) = &scanned.recv_base {
            if let Some(&i) = positions.get(base) {
                decls.types[i].methods.push(scanned.func);
                continue;
            }
        } else if let Some(result) = &scanned.first_result {
            if let Some(&i) = positions.get(result) {
                decls.types[i].funcs.push(scanned.func);
                continue;
            }
        }
        decls.funcs.push(scanned.func);
    }
}

/// Groups typed with a package type go to that type, the rest stay package-level.
fn attach_values(
    decls: &mut Declarations,
    values: Vec<ScannedValue>,
    on_type: fn(&mut TypeDoc) -> &mut Vec<ValueDoc>,
    on_package: fn(&mut Declarations) -> &mut Vec<ValueDoc>,
) {
    for scanned in values {
        let ty = match scanned.type_name.as_deref() {
            Some(name) => decls.find_type_mut(name),
            None => None,
        };
        match ty {
            Some(ty) => on_type(ty).push(scanned.value),
            None => on_package(decls).push(scanned.value),
        }
    }
}

/// `Example_suffix` -> (``, `suffix`), `ExampleT_M` -> (`T_M`, ``).
fn split_example_name(name: &str) -> (&str, &str) {
    match name.rfind('_') {
        Some(i) if name[i + 1..].chars().next().is_some_and(|c| !c.is_uppercase()) => {
            (&name[..i], &name[i + 1..])
        }
        _ => (name, ""),
    }
}

fn find_func_mut<'d>(decls: &'d mut Declarations, name: &str) -> Option<&'d mut FuncDoc> {
    if let Some(i) = decls.funcs.iter().position(|f| f.name == name) {
        return decls.funcs.get_mut(i);
    }
    decls
        .types
        .iter_mut()
        .flat_map(|t| t.funcs.iter_mut())
        .find(|f| f.name == name)
}

/// File examples under the package, a type, a function or a method, the
/// way `go doc` associates them by name.
fn attach_examples(decls: &mut Declarations, examples: Vec<ExampleDoc>) {
    for mut example in examples {
        let Some(target) = example.name.strip_prefix("Example") else {
            continue;
        };
        let (item, suffix) = split_example_name(target);
        let item = item.to_string();
        example.suffix = suffix.to_string();

        if item.is_empty() {
            decls.examples.push(example);
            continue;
        }
        if let Some(ty) = decls.find_type_mut(&item) {
            ty.examples.push(example);
            continue;
        }
        if let Some(func) = find_func_mut(decls, &item) {
            func.examples.push(example);
            continue;
        }
        let method = match item.split_once('_') {
            Some((type_name, method)) => decls
                .find_type_mut(type_name)
                .and_then(|ty| ty.all_funcs_mut().find(|f| f.name == method)),
            None => None,
        };
        match method {
            Some(func) => func.examples.push(example),
            None => tracing::debug!(example = %example.name, "example names no declaration"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = r#"// Copyright notice, not a package doc.

// Package shapes draws things.
//
// @GSD:NOTE experimental
package shapes

import (
	"errors"
	"fmt"
	"strings"
)

//go:generate stringer -type=Kind

// Kind enumerates shapes.
type Kind int

// Kinds of shape.
const (
	KindCircle Kind = iota // round
	KindSquare
)

// MaxSides bounds polygons.
const MaxSides = 12

var (
	// ErrNegative reports a negative radius.
	ErrNegative = errors.New("negative radius")
	registry    map[string]Shape
)

// Shape is anything drawable.
type Shape interface {
	// Area returns the area.
	Area() float64
	fmt.Stringer
}

type (
	// Circle is round.
	Circle struct {
		R float64 // radius
	}

	point struct{ x, y int }
)

// NewCircle builds a circle.
func NewCircle(r float64) *Circle {
	if r < 0 {
		panic("negative radius }")
	}
	return &Circle{R: r}
}

// Area of the circle.
func (c *Circle) Area() float64 { return 3.14 * c.R * c.R }

/* Describe renders a shape.
   Multi-line block comment. */
func Describe(s Shape,
	opts ...string) string {
	return strings.Join(opts, `{`)
}

func helper() {}
"#;

    const EXAMPLES: &str = r#"package shapes_test

import "fmt"

// Example shows the package.
func Example() {
	fmt.Println("hi")
	// Output: hi
}

func ExampleCircle() {
	c := shapes.NewCircle(1)
	fmt.Println(c.R)
	// Output:
	// 1
}

func ExampleCircle_Area_unit() {
	fmt.Println(shapes.NewCircle(1).Area())
}

func ExampleDescribe_sorted() {
	// Unordered output: a
}

func ExampleNowhere() {}

func ExampleHelper(t *testing.T) {}

func TestSomething(t *testing.T) {}
"#;

    fn scan(source: &str) -> std::result::Result<ScannedFile, String> {
        GoParser::new()?.scan(source)
    }

    fn package_in(files: &[(&str, &str)]) -> (tempfile::TempDir, Package) {
        let dir = tempfile::tempdir().unwrap();
        for (name, source) in files {
            fs::write(dir.path().join(name), source).unwrap();
        }
        let mut package = Package::new("example.com/shapes", "example.com/shapes");
        package.dir = dir.path().to_path_buf();
        (dir, package)
    }

    #[test]
    fn test_scan_package_doc_and_name() {
        let file = scan(SOURCE).unwrap();
        assert_eq!(file.package_name, "shapes");
        assert_eq!(file.package_doc, "Package shapes draws things.\n\n@GSD:NOTE experimental");
    }

    #[test]
    fn test_scan_types() {
        let file = scan(SOURCE).unwrap();
        let names: Vec<_> = file.types.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Kind", "Shape", "Circle", "point"]);

        assert_eq!(file.types[0].doc, "Kind enumerates shapes.");
        assert_eq!(file.types[0].decl, "type Kind int");
        assert_eq!(file.types[1].kind, TypeKind::Interface);
        assert_eq!(file.types[1].methods.len(), 1);
        assert_eq!(file.types[1].methods[0].name, "Area");
        assert_eq!(file.types[1].methods[0].doc, "Area returns the area.");
        assert_eq!(file.types[1].methods[0].signature, "Area() float64");

        let circle = &file.types[2];
        assert_eq!(circle.kind, TypeKind::Struct);
        assert_eq!(circle.doc, "Circle is round.");
        assert!(circle.decl.starts_with("type Circle struct {"));
        assert!(circle.decl.contains("R float64"));
        assert!(file.types[3].doc.is_empty());
    }

    #[test]
    fn test_scan_funcs() {
        let file = scan(SOURCE).unwrap();
        let names: Vec<_> = file.funcs.iter().map(|f| f.func.name.as_str()).collect();
        assert_eq!(names, vec!["NewCircle", "Area", "Describe", "helper"]);

        let new_circle = &file.funcs[0];
        assert_eq!(new_circle.first_result.as_deref(), Some("Circle"));
        assert_eq!(new_circle.func.signature, "func NewCircle(r float64) *Circle");
        assert_eq!(new_circle.func.doc, "NewCircle builds a circle.");

        let area = &file.funcs[1];
        assert_eq!(area.func.recv.as_deref(), Some("*Circle"));
        assert_eq!(area.recv_base.as_deref(), Some("Circle"));
        assert!(area.first_result.is_none());

        let describe = &file.funcs[2];
        assert_eq!(describe.func.doc, "Describe renders a shape.\nMulti-line block comment.");
        assert!(describe.func.signature.contains("opts ...string) string"));
        assert!(file.funcs[3].func.doc.is_empty());
    }

    #[test]
    fn test_scan_value_groups() {
        let file = scan(SOURCE).unwrap();
        assert_eq!(file.consts.len(), 2);

        let kinds = &file.consts[0];
        assert_eq!(kinds.value.names, vec!["KindCircle", "KindSquare"]);
        assert_eq!(kinds.value.doc, "Kinds of shape.");
        assert_eq!(kinds.type_name.as_deref(), Some("Kind"));
        assert!(kinds.value.decl.starts_with("const ("));

        assert_eq!(file.consts[1].value.names, vec!["MaxSides"]);
        assert!(file.consts[1].type_name.is_none());

        assert_eq!(file.vars.len(), 1);
        assert_eq!(file.vars[0].value.names, vec!["ErrNegative", "registry"]);
        assert!(file.vars[0].value.doc.is_empty());
    }

    #[test]
    fn test_syntax_error_names_position() {
        let err = scan("package x\n\nfunc f() {\n").unwrap_err();
        assert!(err.contains("syntax error at line"), "{err}");
    }

    #[test]
    fn test_first_result_shapes() {
        let file = scan(
            "package p\n\
             func A(a int) (*T, error) { return nil, nil }\n\
             func B() (t T, err error) { return }\n\
             func C[K comparable](k K) Map[K] { return nil }\n\
             func D() {}\n\
             func E() error { return nil }\n",
        )
        .unwrap();
        let results: Vec<_> = file.funcs.iter().map(|f| f.first_result.as_deref()).collect();
        assert_eq!(results, vec![Some("T"), Some("T"), Some("Map"), None, None]);
    }

    #[test]
    fn test_trailing_comment_is_not_a_doc() {
        let file = scan("package p\n\nvar x = 1 // counter\nfunc F() {}\n").unwrap();
        assert!(file.funcs[0].func.doc.is_empty());
    }

    #[test]
    fn test_example_names() {
        assert_eq!(split_example_name(""), ("", ""));
        assert_eq!(split_example_name("_second"), ("", "second"));
        assert_eq!(split_example_name("Client"), ("Client", ""));
        assert_eq!(split_example_name("Client_Do"), ("Client_Do", ""));
        assert_eq!(split_example_name("Client_Do_retry"), ("Client_Do", "retry"));
    }

    #[test]
    fn test_analyzer_attaches_methods_constructors_and_values() {
        let (_dir, package) = package_in(&[("shapes.go", SOURCE)]);

        let decls = GoSourceAnalyzer.analyze(&package).unwrap();
        assert_eq!(decls.filenames, vec!["shapes.go".to_string()]);
        assert_eq!(decls.name, "shapes");

        let circle = decls.find_type("Circle").unwrap();
        assert_eq!(circle.funcs.len(), 1);
        assert_eq!(circle.funcs[0].name, "NewCircle");
        assert_eq!(circle.methods.len(), 1);
        assert_eq!(circle.methods[0].name, "Area");

        let kind = decls.find_type("Kind").unwrap();
        assert_eq!(kind.consts.len(), 1);
        assert_eq!(kind.consts[0].names, vec!["KindCircle", "KindSquare"]);
        assert_eq!(decls.consts.len(), 1);
        assert_eq!(decls.consts[0].names, vec!["MaxSides"]);
        assert_eq!(decls.vars.len(), 1);

        let package_funcs: Vec<_> = decls.funcs.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(package_funcs, vec!["Describe", "helper"]);
    }

    #[test]
    fn test_examples_attach_by_name() {
        let (_dir, package) = package_in(&[("shapes.go", SOURCE), ("shapes_test.go", EXAMPLES)]);
        let decls = GoSourceAnalyzer.analyze(&package).unwrap();
        assert_eq!(decls.filenames, vec!["shapes.go".to_string()]);

        assert_eq!(decls.examples.len(), 1);
        let package_example = &decls.examples[0];
        assert_eq!(package_example.name, "Example");
        assert_eq!(package_example.doc, "Example shows the package.");
        assert_eq!(package_example.code, r#"fmt.Println("hi")"#);
        assert_eq!(package_example.output.as_deref(), Some("hi"));

        let circle = decls.find_type("Circle").unwrap();
        assert_eq!(circle.examples.len(), 1);
        assert_eq!(circle.examples[0].code, "c := shapes.NewCircle(1)\nfmt.Println(c.R)");
        assert_eq!(circle.examples[0].output.as_deref(), Some("1"));

        let area = &circle.methods[0].examples;
        assert_eq!(area.len(), 1);
        assert_eq!(area[0].suffix, "unit");
        assert!(area[0].output.is_none());

        let describe = decls.funcs.iter().find(|f| f.name == "Describe").unwrap();
        assert_eq!(describe.examples.len(), 1);
        assert_eq!(describe.examples[0].suffix, "sorted");
        assert!(describe.examples[0].unordered);
        assert_eq!(describe.examples[0].output.as_deref(), Some("a"));
        assert!(describe.examples[0].code.is_empty());

        let helper = decls.funcs.iter().find(|f| f.name == "helper").unwrap();
        assert!(helper.examples.is_empty());
    }

    #[test]
    fn test_broken_test_file_is_skipped() {
        let (_dir, package) = package_in(&[
            ("shapes.go", SOURCE),
            ("shapes_test.go", "package shapes\nfunc Broken( {"),
        ]);
        let decls = GoSourceAnalyzer.analyze(&package).unwrap();
        assert!(decls.examples.is_empty());
        assert_eq!(decls.types.len(), 4);
    }

    #[test]
    fn test_doc_go_wins_package_doc() {
        let (_dir, package) = package_in(&[
            ("a.go", "// Package shapes from a.go.\npackage shapes\n"),
            ("doc.go", "// Package shapes is documented here.\npackage shapes\n"),
        ]);
        let decls = GoSourceAnalyzer.analyze(&package).unwrap();
        assert_eq!(decls.doc, "Package shapes is documented here.");
    }

    #[test]
    fn test_analyzer_reports_file_in_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("bad.go"), "package bad\nfunc f() {\n").unwrap();
        let mut package = Package::new("example.com/bad", "example.com/bad");
        package.dir = dir.path().to_path_buf();

        let err = GoSourceAnalyzer.analyze(&package).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("example.com/bad"));
        assert!(msg.contains("bad.go"));
    }

    #[test]
    fn test_missing_directory_is_analysis_error() {
        let mut package = Package::new("example.com/gone", "example.com/gone");
        package.dir = PathBuf::from("/definitely/not/here");
        assert!(matches!(
            GoSourceAnalyzer.analyze(&package),
            Err(DocsError::Analysis { .. })
        ));
    }
}
