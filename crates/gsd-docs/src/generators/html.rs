//! HTML pages from embedded minijinja templates.

use minijinja::{AutoEscape, Environment, Value, context};
use rust_embed::RustEmbed;
use serde::Serialize;

use super::{PageKind, PageRenderer, PageTarget, RenderContext};
use crate::error::{DocsError, Result};
use crate::model::{FuncDoc, Package, TypeDoc, ValueDoc};
use crate::tree::ancestors;

#[derive(RustEmbed)]
#[folder = "templates"]
struct Templates;

/// Renders pages with the built-in template set.
#[derive(Debug)]
pub struct HtmlRenderer {
    env: Environment<'static>,
}

#[derive(Serialize)]
struct PackageEntry<'a> {
    import_path: &'a str,
    name: &'a str,
    summary: &'a str,
    depth: usize,
}

impl HtmlRenderer {
    /// Load every embedded template.
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        // Converted markdown and the sidebar are marked `|safe` in templates.
        env.set_auto_escape_callback(|_| AutoEscape::Html);
        for name in Templates::iter() {
            let file = Templates::get(&name)
                .ok_or_else(|| DocsError::render(name.as_ref(), "embedded template disappeared"))?;
            let source = String::from_utf8(file.data.into_owned())
                .map_err(|err| DocsError::render(name.as_ref(), err))?;
            env.add_template_owned(name.to_string(), source)
                .map_err(|err| DocsError::render(name.as_ref(), err))?;
        }
        Ok(Self { env })
    }

    fn page<'a>(ctx: &'a RenderContext<'_>, target: &PageTarget) -> Result<&'a Package> {
        ctx.index
            .get(&target.import_path)
            .ok_or_else(|| DocsError::render(target.virtual_path(), "unknown package"))
    }

    fn visible_types<'a>(ctx: &RenderContext<'_>, package: &'a Package) -> Vec<&'a TypeDoc> {
        package
            .declarations
            .types
            .iter()
            .filter(|t| ctx.type_visible(t))
            .collect()
    }

    fn visible_funcs<'a>(ctx: &RenderContext<'_>, funcs: &'a [FuncDoc]) -> Vec<&'a FuncDoc> {
        funcs.iter().filter(|f| ctx.func_visible(f)).collect()
    }

    fn visible_values<'a>(ctx: &RenderContext<'_>, values: &'a [ValueDoc]) -> Vec<&'a ValueDoc> {
        values.iter().filter(|v| ctx.value_visible(v)).collect()
    }

    fn entries<'a>(ctx: &'a RenderContext<'_>, paths: impl Iterator<Item = &'a String>) -> Vec<PackageEntry<'a>> {
        paths
            .filter_map(|path| ctx.index.get(path))
            .map(|pkg| PackageEntry {
                import_path: &pkg.import_path,
                name: &pkg.name,
                summary: &pkg.documentation.summary.html,
                depth: ancestors(ctx.index, &pkg.import_path).len(),
            })
            .collect()
    }

    fn page_data(&self, ctx: &RenderContext<'_>, target: &PageTarget) -> Result<(&'static str, Value)> {
        let page = target.virtual_path();
        let data = match target.kind {
            PageKind::Index => (
                "index.html",
                context! {
                    packages => Self::entries(ctx, ctx.index.keys()),
                    readme => ctx.readme("").map(|r| r.html.as_str()),
                },
            ),
            PageKind::Readme => {
                let readme = ctx
                    .readme(&target.import_path)
                    .ok_or_else(|| DocsError::render(&page, "unknown readme"))?;
                (
                    "readme.html",
                    context! {
                        dir => &readme.dir,
                        readme => &readme.html,
                    },
                )
            }
            PageKind::Package => {
                let package = Self::page(ctx, target)?;
                (
                    "package.html",
                    context! {
                        package => package,
                        import_path => &package.import_path,
                        breadcrumbs => Self::entries(ctx, ancestors(ctx.index, &package.import_path).iter()),
                        sub_packages => Self::entries(ctx, package.sub_packages.iter()),
                        consts => Self::visible_values(ctx, &package.declarations.consts),
                        vars => Self::visible_values(ctx, &package.declarations.vars),
                        types => Self::visible_types(ctx, package),
                        funcs => Self::visible_funcs(ctx, &package.declarations.funcs),
                        examples => &package.declarations.examples,
                    },
                )
            }
            PageKind::Type => {
                let package = Self::page(ctx, target)?;
                let ty = target
                    .type_name
                    .as_deref()
                    .and_then(|name| package.declarations.find_type(name))
                    .ok_or_else(|| DocsError::render(&page, "unknown type"))?;
                (
                    "type.html",
                    context! {
                        package => package,
                        import_path => &package.import_path,
                        ty => ty,
                        consts => Self::visible_values(ctx, &ty.consts),
                        vars => Self::visible_values(ctx, &ty.vars),
                        funcs => Self::visible_funcs(ctx, &ty.funcs),
                        methods => Self::visible_funcs(ctx, &ty.methods),
                        examples => &ty.examples,
                    },
                )
            }
            PageKind::Function => {
                let package = Self::page(ctx, target)?;
                let func_name = target.func_name.as_deref().unwrap_or_default();
                let (ty, func) = match target.type_name.as_deref() {
                    Some(type_name) => {
                        let ty = package.declarations.find_type(type_name);
                        let func = ty.and_then(|t| t.all_funcs().find(|f| f.name == func_name));
                        (ty, func)
                    }
                    None => (
                        None,
                        package.declarations.funcs.iter().find(|f| f.name == func_name),
                    ),
                };
                let func = func.ok_or_else(|| DocsError::render(&page, "unknown function"))?;
                (
                    "func.html",
                    context! {
                        package => package,
                        import_path => &package.import_path,
                        ty => ty,
                        func => func,
                        examples => &func.examples,
                    },
                )
            }
        };
        Ok(data)
    }
}

impl PageRenderer for HtmlRenderer {
    fn render(&self, ctx: &RenderContext<'_>, target: &PageTarget) -> Result<Vec<u8>> {
        let page = target.virtual_path();
        let (template, data) = self.page_data(ctx, target)?;

        let html = self
            .env
            .get_template(template)
            .and_then(|tmpl| {
                tmpl.render(context! {
                    sidebar => &ctx.sidebar,
                    generated_at => ctx.generated_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
                    include_unexported => ctx.include_unexported,
                    ..data
                })
            })
            .map_err(|err| DocsError::render(&page, err))?;

        Ok(html.into_bytes())
    }
}
