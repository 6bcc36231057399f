//! Command-line interface for the searchmap utility
//!
//! Every editing command loads a map document, applies one operation through
//! [`SearchMap`] with a headless renderer and writes the document back.

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use tracing::debug;

use crate::outline::render_outline;
use searchmap::core::logging::{init_logging, LogFormat, LogLevel, LogSettings};
use searchmap::{Graph, GraphConfig, HeadlessRenderer, Location, NodeId, NodeKind, SearchMap};

/// SearchMap - Build, edit and inspect mind-map documents
#[derive(Parser)]
#[command(name = "searchmap")]
#[command(about = "A Rust utility to build, edit and inspect mind-map documents")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Set log level (off|error|warn|info|debug|trace)
    #[arg(long, default_value_t = LogLevel::Warn, global = true)]
    pub log_level: LogLevel,

    /// Set log format (compact|pretty|json)
    #[arg(long, default_value_t = LogFormat::Compact, global = true)]
    pub log_format: LogFormat,
}

/// Map document to edit and where to write the result
#[derive(Args, Debug, Clone)]
pub struct MapArgs {
    /// Map document to read
    #[arg(short, long)]
    pub map: PathBuf,

    /// Where to write the edited map (defaults to the input file, - for stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a map holding a single root title
    New {
        /// Text of the root title
        #[arg(short, long, default_value = "Search")]
        title: String,

        /// Output file for the map (use - for stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Add a node, placed automatically around its parent
    Add {
        #[command(flatten)]
        map: MapArgs,

        /// Kind of node to add
        #[arg(short, long, value_enum, default_value_t = KindChoice::Text)]
        kind: KindChoice,

        /// Text, URL or path, depending on the kind
        content: String,

        /// Parent node (e.g. 3 or #3)
        #[arg(short, long, value_parser = parse_node_id)]
        parent: Option<NodeId>,

        /// Explicit location as X,Y instead of automatic placement
        #[arg(long, value_parser = parse_location, allow_hyphen_values = true)]
        at: Option<Location>,
    },

    /// Join two nodes as siblings
    Link {
        #[command(flatten)]
        map: MapArgs,

        #[arg(value_parser = parse_node_id)]
        a: NodeId,

        #[arg(value_parser = parse_node_id)]
        b: NodeId,
    },

    /// Remove the sibling link between two nodes
    Unlink {
        #[command(flatten)]
        map: MapArgs,

        #[arg(value_parser = parse_node_id)]
        a: NodeId,

        #[arg(value_parser = parse_node_id)]
        b: NodeId,
    },

    /// Give a node a new parent, or detach it
    Reparent {
        #[command(flatten)]
        map: MapArgs,

        #[arg(value_parser = parse_node_id)]
        node: NodeId,

        /// New parent; omit to detach the node
        #[arg(short, long, value_parser = parse_node_id)]
        parent: Option<NodeId>,
    },

    /// Move a node to X,Y
    Move {
        #[command(flatten)]
        map: MapArgs,

        #[arg(value_parser = parse_node_id)]
        node: NodeId,

        #[arg(value_parser = parse_location, allow_hyphen_values = true)]
        to: Location,
    },

    /// Change the size of a node
    Resize {
        #[command(flatten)]
        map: MapArgs,

        #[arg(value_parser = parse_node_id)]
        node: NodeId,

        #[arg(long)]
        width: i32,

        #[arg(long)]
        height: i32,
    },

    /// Delete a node, handing its children to its parent
    Delete {
        #[command(flatten)]
        map: MapArgs,

        #[arg(value_parser = parse_node_id)]
        node: NodeId,
    },

    /// Show the structure of a map
    Inspect {
        /// Map document to read (use - for stdin)
        #[arg(short, long)]
        map: Option<PathBuf>,

        /// Show in JSON format
        #[arg(long)]
        json: bool,

        /// When to use colors in output
        #[arg(long, value_enum, default_value_t = ColorChoice::Auto)]
        color: ColorChoice,
    },

    /// Check that a map document is consistent
    Validate {
        /// Map document to validate (use - for stdin)
        #[arg(short, long)]
        map: Option<PathBuf>,
    },
}

/// Node kinds that can be created from the command line
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq, Default)]
pub enum KindChoice {
    Title,
    #[default]
    Text,
    Url,
    File,
}

impl KindChoice {
    fn build(self, content: String) -> NodeKind {
        match self {
            KindChoice::Title => NodeKind::title(content),
            KindChoice::Text => NodeKind::text(content),
            KindChoice::Url => NodeKind::web_link(content),
            KindChoice::File => NodeKind::file(content),
        }
    }
}

/// When to colorize output
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq, Default)]
pub enum ColorChoice {
    /// Use colors if output is a terminal and NO_COLOR is not set
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Parse `3` or `#3`
pub fn parse_node_id(s: &str) -> std::result::Result<NodeId, String> {
    s.trim()
        .trim_start_matches('#')
        .parse::<u32>()
        .map(NodeId)
        .map_err(|e| format!("invalid node id '{}': {}", s, e))
}

/// Parse `X,Y`
pub fn parse_location(s: &str) -> std::result::Result<Location, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("invalid location '{}': expected X,Y", s))?;
    let x = x
        .trim()
        .parse::<i32>()
        .map_err(|e| format!("invalid x in '{}': {}", s, e))?;
    let y = y
        .trim()
        .parse::<i32>()
        .map_err(|e| format!("invalid y in '{}': {}", s, e))?;
    Ok(Location::new(x, y))
}

/// Main CLI application
pub struct SearchMapApp {
    config: GraphConfig,
}

impl SearchMapApp {
    /// Create a new application instance with default settings
    pub fn new() -> Self {
        Self::with_config(GraphConfig::default())
    }

    pub fn with_config(config: GraphConfig) -> Self {
        Self { config }
    }

    fn session(&self) -> SearchMap<HeadlessRenderer> {
        SearchMap::with_config(
            HeadlessRenderer::new(),
            self.config.clone(),
            Default::default(),
        )
    }

    /// Run the application with the given CLI arguments
    pub fn run(&mut self, cli: Cli) -> Result<()> {
        // Environment variables take precedence over flags
        let flags = LogSettings::new(cli.log_level, cli.log_format);
        let settings = flags.clone().with_env_overrides().unwrap_or_else(|e| {
            eprintln!("Warning: Ignoring logging environment: {}", e);
            flags
        });
        if let Err(e) = init_logging(&settings) {
            eprintln!("Warning: Failed to initialize logging: {}", e);
        }

        if cli.verbose {
            eprintln!("SearchMap v{}", env!("CARGO_PKG_VERSION"));
        }

        let verbose = cli.verbose;
        match cli.command {
            Commands::New { title, output } => self.new_command(&title, output, verbose),
            Commands::Add {
                map,
                kind,
                content,
                parent,
                at,
            } => {
                let id = self.edit(&map, verbose, |session| {
                    Ok(session.add_node(kind.build(content), parent, at)?)
                })?;
                eprintln!("Added node {}", id);
                Ok(())
            }
            Commands::Link { map, a, b } => {
                self.edit(&map, verbose, |session| Ok(session.add_sibling(a, b)?))
            }
            Commands::Unlink { map, a, b } => {
                self.edit(&map, verbose, |session| Ok(session.remove_sibling(a, b)?))
            }
            Commands::Reparent { map, node, parent } => {
                self.edit(&map, verbose, |session| Ok(session.set_parent(node, parent)?))
            }
            Commands::Move { map, node, to } => {
                self.edit(&map, verbose, |session| Ok(session.move_node(node, to)?))
            }
            Commands::Resize {
                map,
                node,
                width,
                height,
            } => self.edit(&map, verbose, |session| {
                Ok(session.resize_node(node, width, height)?)
            }),
            Commands::Delete { map, node } => {
                self.edit(&map, verbose, |session| Ok(session.delete_node(node)?))
            }
            Commands::Inspect { map, json, color } => self.inspect_command(map, json, color),
            Commands::Validate { map } => self.validate_command(map, verbose),
        }
    }

    /// Handle the new command
    fn new_command(&self, title: &str, output: Option<PathBuf>, verbose: bool) -> Result<()> {
        let mut session = self.session();
        session.add_node(NodeKind::title(title), None, None)?;
        let json = session.save_json()?;
        if verbose {
            eprintln!("Created map with root '{}'", title);
        }
        self.write_output(output, &json)
    }

    /// Load `args.map`, apply `operation` and write the result
    fn edit<T>(
        &self,
        args: &MapArgs,
        verbose: bool,
        operation: impl FnOnce(&mut SearchMap<HeadlessRenderer>) -> Result<T>,
    ) -> Result<T> {
        debug!(map = %args.map.display(), "Loading map for edit");
        let mut session = self.session();
        session
            .load_file(&args.map)
            .with_context(|| format!("Failed to load map '{}'", args.map.display()))?;

        let value = operation(&mut session)?;

        let json = session.save_json()?;
        if verbose {
            eprintln!(
                "Map now has {} nodes and {} connections",
                session.graph().node_count(),
                session.graph().connection_count()
            );
        }
        let target = args.output.clone().unwrap_or_else(|| args.map.clone());
        self.write_output(Some(target), &json)?;
        Ok(value)
    }

    /// Handle the inspect command
    fn inspect_command(&self, map: Option<PathBuf>, json: bool, color: ColorChoice) -> Result<()> {
        let graph = self.load_graph(map)?;

        if json {
            let nodes: Vec<serde_json::Value> = graph
                .nodes()
                .map(|node| {
                    serde_json::json!({
                        "id": node.id(),
                        "kind": node.kind().tag(),
                        "summary": node.kind().summary(),
                        "location": node.location(),
                        "size": [node.width(), node.height()],
                        "parent": node.parent(),
                        "children": node.children().collect::<Vec<_>>(),
                        "siblings": node.siblings().collect::<Vec<_>>(),
                    })
                })
                .collect();
            let summary = serde_json::json!({
                "root": graph.root(),
                "canvas": [graph.width(), graph.height()],
                "nodes": nodes,
                "connections": graph.connection_count(),
            });
            println!("{}", serde_json::to_string_pretty(&summary)?);
        } else {
            let colored = self.should_colorize(color);
            self.write_output(None, &render_outline(&graph, colored))?;
        }
        Ok(())
    }

    /// Determine if we should colorize stdout
    fn should_colorize(&self, color: ColorChoice) -> bool {
        match color {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => {
                if std::env::var("NO_COLOR").is_ok() {
                    return false;
                }
                crossterm::tty::IsTty::is_tty(&std::io::stdout())
            }
        }
    }

    /// Handle the validate command
    fn validate_command(&self, map: Option<PathBuf>, verbose: bool) -> Result<()> {
        match self.load_graph(map) {
            Ok(graph) => {
                if verbose {
                    eprintln!("Checked {} nodes", graph.node_count());
                }
                println!("✓ Valid map with {} nodes", graph.node_count());
                Ok(())
            }
            Err(e) => {
                println!("✗ Invalid map: {:#}", e);
                Err(e)
            }
        }
    }

    /// Parse a document; parsing already rejects inconsistent structure
    pub fn load_graph(&self, map: Option<PathBuf>) -> Result<Graph> {
        let content = self.read_input(map)?;
        Ok(Graph::from_json(&content, self.config.clone())?)
    }

    /// Read input from file or stdin
    pub fn read_input(&self, input: Option<PathBuf>) -> Result<String> {
        match input {
            Some(path) if path.to_string_lossy() != "-" => fs::read_to_string(&path)
                .map_err(|e| anyhow!("Failed to read map file '{}': {}", path.display(), e)),
            _ => {
                let mut content = String::new();
                io::stdin().read_to_string(&mut content)?;
                Ok(content)
            }
        }
    }

    /// Write output to file or stdout
    pub fn write_output(&self, output: Option<PathBuf>, content: &str) -> Result<()> {
        match output {
            Some(path) if path.to_string_lossy() != "-" => {
                fs::write(&path, content).map_err(|e| {
                    anyhow!("Failed to write output file '{}': {}", path.display(), e)
                })?;
            }
            _ => {
                if content.is_empty() || content.ends_with('\n') {
                    print!("{}", content);
                } else {
                    println!("{}", content);
                }
                io::stdout().flush()?;
            }
        }
        Ok(())
    }
}

impl Default for SearchMapApp {
    fn default() -> Self {
        Self::new()
    }
}
