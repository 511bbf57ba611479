//! Command-line front ends for the parsl HTML parsing core.
//!
//! Two subcommands, mirroring the example consumers the core is designed
//! around: `dump` walks the finished tree and prints it (grounded on the
//! reference `dumptree` tool), and `gemtext` converts an HTML document to
//! a Gemini-protocol "gemtext" document (grounded on the reference
//! `webgem` tool).

use std::fs;
use std::io::Read as _;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use parsl_dom::{DomTree, NodeId, NodeType};
use parsl_html::{HTMLParser, HTMLTokenizer};

/// Tools built on the parsl HTML parsing core.
#[derive(Parser, Debug)]
#[command(name = "parsl-cli", author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the parsed DOM tree, indented one level per depth.
    Dump {
        /// HTML file to parse. Reads stdin if omitted.
        file: Option<PathBuf>,

        /// Print the stack of open elements at the end of parsing.
        #[arg(short = 's', long)]
        stack: bool,

        /// Print the tree without indentation, one node per line.
        #[arg(short = 'f', long)]
        flat: bool,

        /// Reconstruct approximate HTML source from the tree instead of an
        /// indented dump.
        #[arg(short = 'r', long)]
        reconstruct: bool,

        /// Suppress text node content, showing only element structure.
        #[arg(short = 'q', long)]
        quiet: bool,
    },
    /// Convert an HTML document to a gemtext document.
    Gemtext {
        /// HTML file to convert. Reads stdin if omitted.
        file: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Dump { file, stack, flat, reconstruct, quiet } => {
            run_dump(file.as_deref(), stack, flat, reconstruct, quiet)
        }
        Command::Gemtext { file } => run_gemtext(file.as_deref()),
    }
}

fn read_input(file: Option<&std::path::Path>) -> Result<String> {
    match file {
        Some(path) => fs::read_to_string(path).with_context(|| format!("reading {}", path.display())),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("reading stdin")?;
            Ok(buf)
        }
    }
}

fn parse(html: &str) -> (DomTree, Vec<parsl_html::ParseIssue>) {
    let mut tokenizer = HTMLTokenizer::new(html.to_string());
    let mut tokens = Vec::new();
    loop {
        if let Some(tok) = tokenizer.tokenize() {
            let is_eof = tok.is_eof();
            tokens.push(tok);
            if is_eof {
                break;
            }
        }
    }
    let parser = HTMLParser::new(tokens);
    parser.run_with_issues()
}

/// The `dump` subcommand: walk the finished tree and print it, in the
/// style of the reference `dumptree` tool's `begin`/`end` handlers.
fn run_dump(file: Option<&std::path::Path>, stack: bool, flat: bool, reconstruct: bool, quiet: bool) -> Result<()> {
    let html = read_input(file)?;
    let (tree, issues) = parse(&html);

    if reconstruct {
        println!("<!DOCTYPE html>");
        reconstruct_html(&tree, tree.root());
        println!();
    } else if flat {
        for id in tree.descendants(tree.root()) {
            print_flat_node(&tree, id, quiet);
        }
    } else {
        print_indented(&tree, tree.root(), 0, quiet);
    }

    if stack {
        let path: Vec<&str> = tree
            .descendants(tree.root())
            .filter_map(|id| tree.as_element(id).map(|e| e.tag_name.as_str()))
            .collect();
        println!("stack: {}", path.join("."));
    }

    for issue in &issues {
        eprintln!("{issue}");
    }

    Ok(())
}

fn print_indented(tree: &DomTree, id: NodeId, depth: usize, quiet: bool) {
    let indent = "  ".repeat(depth);
    match tree.get(id).map(|n| &n.node_type) {
        Some(NodeType::Element(data)) => {
            println!("{indent}<{}>", data.tag_name);
            for &child in tree.children(id) {
                print_indented(tree, child, depth + 1, quiet);
            }
        }
        Some(NodeType::Text(text)) => {
            if !quiet {
                println!("{indent}#text: {}", text.replace('\n', "$"));
            }
        }
        Some(NodeType::Comment(data)) => println!("{indent}<!--{data}-->"),
        Some(NodeType::Document) => {
            for &child in tree.children(id) {
                print_indented(tree, child, depth, quiet);
            }
        }
        None => {}
    }
}

fn print_flat_node(tree: &DomTree, id: NodeId, quiet: bool) {
    match tree.get(id).map(|n| &n.node_type) {
        Some(NodeType::Element(data)) => println!("<{}>", data.tag_name),
        Some(NodeType::Text(text)) => {
            if !quiet {
                println!("#text: {}", text.replace('\n', "$"));
            }
        }
        Some(NodeType::Comment(data)) => println!("<!--{data}-->"),
        Some(NodeType::Document) | None => {}
    }
}

/// Reconstruct approximate HTML source from the tree (the `-r` flag).
/// Attribute order and quoting style are not preserved faithfully.
fn reconstruct_html(tree: &DomTree, id: NodeId) {
    match tree.get(id).map(|n| &n.node_type) {
        Some(NodeType::Element(data)) => {
            let attrs: String = data
                .attrs
                .iter()
                .map(|a| format!(" {}=\"{}\"", a.name, a.value))
                .collect();
            print!("<{}{attrs}>", data.tag_name);
            for &child in tree.children(id) {
                reconstruct_html(tree, child);
            }
            print!("</{}>", data.tag_name);
        }
        Some(NodeType::Text(text)) => print!("{text}"),
        Some(NodeType::Comment(data)) => print!("<!--{data}-->"),
        Some(NodeType::Document) => {
            for &child in tree.children(id) {
                reconstruct_html(tree, child);
            }
        }
        None => {}
    }
}

/// The `gemtext` subcommand: convert block-level HTML content to gemtext,
/// collecting and deduplicating `<a href>` links per block, in the style
/// of the reference `webgem` tool.
fn run_gemtext(file: Option<&std::path::Path>) -> Result<()> {
    let html = read_input(file)?;
    let (tree, _issues) = parse(&html);

    let mut converter = GemtextConverter::default();
    if let Some(body) = tree.body() {
        converter.walk(&tree, body);
    }
    converter.flush_block();
    print!("{}", converter.output);

    Ok(())
}

/// Target line width for gemtext's simple word-wrapping.
const GEMTEXT_WRAP_WIDTH: usize = 80;

/// Collapse runs of whitespace (including newlines) to a single space, per
/// the living standard's rules for inter-element whitespace.
fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

/// Greedily word-wrap `text` (already whitespace-collapsed) to `width` columns.
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split(' ') {
        if current.is_empty() {
            current.push_str(word);
        } else if current.len() + 1 + word.len() <= width {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

#[derive(Default)]
struct GemtextConverter {
    output: String,
    block_text: String,
    block_tag: Option<String>,
    links: Vec<(String, String)>,
    seen_urls: std::collections::HashSet<String>,
    current_href: Option<String>,
    link_text: String,
}

impl GemtextConverter {
    fn walk(&mut self, tree: &DomTree, id: NodeId) {
        match tree.get(id).map(|n| &n.node_type) {
            Some(NodeType::Element(data)) => {
                let tag = data.tag_name.clone();
                let is_block = matches!(
                    tag.as_str(),
                    "p" | "div" | "li" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "blockquote"
                );
                if is_block {
                    self.flush_block();
                    self.block_tag = Some(tag.clone());
                }
                if tag == "a" {
                    self.current_href = data.attrs.get("href").map(ToOwned::to_owned);
                    self.link_text.clear();
                }
                for &child in tree.children(id) {
                    self.walk(tree, child);
                }
                if tag == "a" {
                    if let Some(href) = self.current_href.take() {
                        self.add_link(href, self.link_text.clone());
                    }
                }
                if is_block {
                    self.flush_block();
                }
            }
            Some(NodeType::Text(text)) => {
                if self.current_href.is_some() {
                    self.link_text.push_str(text);
                } else {
                    self.block_text.push_str(text);
                }
            }
            Some(NodeType::Comment(_) | NodeType::Document) | None => {
                for &child in tree.children(id) {
                    self.walk(tree, child);
                }
            }
        }
    }

    fn add_link(&mut self, url: String, desc: String) {
        if self.seen_urls.insert(url.clone()) {
            self.links.push((url, desc.trim().to_string()));
        }
    }

    fn flush_block(&mut self) {
        let collapsed = collapse_whitespace(&self.block_text);
        let text = collapsed.trim();
        if !text.is_empty() {
            let (prefix, wrap_width) = match self.block_tag.as_deref() {
                Some("h1") => ("# ", None),
                Some("h2") => ("## ", None),
                Some("h3" | "h4" | "h5" | "h6") => ("### ", None),
                Some("li") => ("* ", Some(GEMTEXT_WRAP_WIDTH - 2)),
                Some("blockquote") => ("> ", Some(GEMTEXT_WRAP_WIDTH - 2)),
                _ => ("", Some(GEMTEXT_WRAP_WIDTH)),
            };
            match wrap_width {
                Some(width) => {
                    for line in wrap_text(text, width) {
                        self.output.push_str(prefix);
                        self.output.push_str(&line);
                        self.output.push('\n');
                    }
                }
                None => {
                    self.output.push_str(prefix);
                    self.output.push_str(text);
                    self.output.push('\n');
                }
            }
        }
        self.block_text.clear();
        self.block_tag = None;

        if !self.links.is_empty() {
            for (url, desc) in self.links.drain(..) {
                if desc.is_empty() {
                    self.output.push_str(&format!("=> {url}\n"));
                } else {
                    self.output.push_str(&format!("=> {url} {desc}\n"));
                }
            }
            self.output.push('\n');
        }
    }
}
