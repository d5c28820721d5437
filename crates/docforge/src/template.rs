//! The `mkdocs.yml` template rendered from project features.
//!
//! The template is built as a node tree and serialized by the codec, so
//! every value is quoted the way the parser reads it back.

use crate::features::{CiProvider, SiteFeatures};
use docforge_yaml::{Document, Node};

const GEN_FILES_SCRIPT: &str = "docs/generated/gen_ref_pages.py";
const MERMAID_FENCE: &str = "!!python/name:mermaid2.fence_mermaid_custom";

/// A generated CLI reference page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliPage {
    /// Title in the navigation, e.g. `Tools Main`
    pub display_name: String,
    /// File name under `docs/generated/`
    pub filename: String,
}

/// Render the template text for `features`.
pub fn render_template(features: &SiteFeatures) -> String {
    Document::from_root(build_config(features)).serialize()
}

/// The template as a node tree.
pub fn build_config(features: &SiteFeatures) -> Node {
    let mut entries = vec![("site_name", Node::string(&features.project_name))];
    if let Some(site_url) = &features.site_url {
        entries.push(("site_url", Node::string(site_url)));
    }
    if let Some(repo_url) = &features.repo_url {
        entries.push(("repo_url", Node::string(repo_url)));
        if let Some(provider) = features.ci_provider {
            entries.push(("edit_uri", Node::string(edit_uri(provider))));
        }
    }
    entries.push(("theme", theme()));
    entries.push(("plugins", plugins(features)));
    entries.push(("markdown_extensions", markdown_extensions()));
    entries.push(("nav", nav(features)));
    Node::mapping(entries)
}

fn edit_uri(provider: CiProvider) -> &'static str {
    match provider {
        CiProvider::Github => "edit/main/docs/",
        CiProvider::Gitlab => "-/edit/main/docs/",
    }
}

fn strings(items: &[&str]) -> Node {
    Node::sequence(items.iter().map(|item| Node::string(*item)).collect())
}

fn theme() -> Node {
    let scheme = |scheme: &str, icon: &str, label: &str| {
        Node::mapping([
            ("scheme", Node::string(scheme)),
            ("primary", Node::string("indigo")),
            ("accent", Node::string("indigo")),
            (
                "toggle",
                Node::mapping([("icon", Node::string(icon)), ("name", Node::string(label))]),
            ),
        ])
    };
    Node::mapping([
        ("name", Node::string("material")),
        (
            "palette",
            Node::sequence(vec![
                scheme("default", "material/brightness-7", "Switch to dark mode"),
                scheme("slate", "material/brightness-4", "Switch to light mode"),
            ]),
        ),
        (
            "features",
            strings(&[
                "navigation.tabs",
                "navigation.sections",
                "navigation.top",
                "search.suggest",
                "search.highlight",
                "content.code.copy",
            ]),
        ),
    ])
}

fn plugins(features: &SiteFeatures) -> Node {
    let mut items = vec![
        Node::string("search"),
        Node::mapping([(
            "gen-files",
            Node::mapping([("scripts", strings(&[GEN_FILES_SCRIPT]))]),
        )]),
        Node::mapping([(
            "literate-nav",
            Node::mapping([("nav_file", Node::string("SUMMARY.md"))]),
        )]),
        Node::mapping([(
            "mkdocstrings",
            Node::mapping([(
                "handlers",
                Node::mapping([(
                    "python",
                    Node::mapping([
                        ("paths", strings(&["src"]).flow()),
                        (
                            "options",
                            Node::mapping([
                                ("docstring_style", Node::string("google")),
                                ("show_source", Node::boolean(true)),
                            ]),
                        ),
                    ]),
                )]),
            )]),
        )]),
        Node::string("mermaid2"),
        Node::string("termynal"),
        Node::string("recently-updated"),
    ];

    if !features.c_source_dirs.is_empty() {
        let project = Node::mapping([
            ("src-dirs", Node::string(features.c_source_dirs.join(" "))),
            ("full-doc", Node::boolean(true)),
        ]);
        items.push(Node::mapping([(
            "mkdoxy",
            Node::mapping([(
                "projects",
                Node::mapping([(slug(&features.project_name), project)]),
            )]),
        )]));
    }
    if features.has_typer {
        items.push(Node::string("mkdocs-typer2"));
    }
    Node::sequence(items)
}

fn markdown_extensions() -> Node {
    let mermaid_fence = Node::mapping([
        ("name", Node::string("mermaid")),
        ("class", Node::string("mermaid")),
        ("format", Node::tagged(MERMAID_FENCE, "")),
    ]);
    Node::sequence(vec![
        Node::string("admonition"),
        Node::string("pymdownx.details"),
        Node::mapping([(
            "pymdownx.superfences",
            Node::mapping([("custom_fences", Node::sequence(vec![mermaid_fence]))]),
        )]),
        Node::string("pymdownx.highlight"),
        Node::string("pymdownx.inlinehilite"),
        Node::mapping([(
            "pymdownx.tabbed",
            Node::mapping([("alternate_style", Node::boolean(true))]),
        )]),
        Node::mapping([("toc", Node::mapping([("permalink", Node::boolean(true))]))]),
    ])
}

fn nav(features: &SiteFeatures) -> Node {
    let page = |title: &str, file: &str| Node::mapping([(title, Node::string(file))]);
    let mut items = vec![
        page("Home", "index.md"),
        page("Install", "install.md"),
        page("Python API", "generated/python-api.md"),
    ];

    let cli = cli_pages(&features.cli_modules);
    if !cli.is_empty() {
        let pages = cli
            .iter()
            .map(|p| page(&p.display_name, &format!("generated/{}", p.filename)))
            .collect();
        items.push(Node::mapping([("CLI Reference", Node::sequence(pages))]));
    }
    if !features.c_source_dirs.is_empty() {
        items.push(page("C API", "generated/c-api.md"));
    }
    Node::sequence(items)
}

/// Navigation titles and file names for the CLI modules.
///
/// `demo.tools.main` becomes `Tools Main` in `cli-api-tools-main.md`; a
/// single module always lives in `cli-api.md`.
pub fn cli_pages(modules: &[String]) -> Vec<CliPage> {
    modules
        .iter()
        .map(|module| {
            let parts: Vec<&str> = module.split('.').collect();
            let friendly = if parts.len() > 1 {
                parts[1..].join("-")
            } else {
                module.clone()
            };
            let display_name = friendly
                .split('-')
                .map(capitalize)
                .collect::<Vec<_>>()
                .join(" ");
            let filename = if modules.len() > 1 {
                format!("cli-api-{friendly}.md")
            } else {
                "cli-api.md".to_string()
            };
            CliPage {
                display_name,
                filename,
            }
        })
        .collect()
}

/// Upper-case the first character and lower-case the rest.
fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

fn slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_matches('-').to_string()
}
