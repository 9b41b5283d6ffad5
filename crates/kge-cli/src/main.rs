use clap::{Args as ClapArgs, Parser, Subcommand};
use kge_core::{Config, DigOptions, FileIo, IoOptions, Key, ProfileSelector, RuleSet, dig, paths};
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "kge",
    about = "Edit Karabiner-Elements configs and complex modification rule sets",
    version
)]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(ClapArgs, Debug)]
struct ConfigArgs {
    /// Config file (defaults to ~/.config/karabiner/karabiner.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Do not keep a timestamped copy of files before overwriting them
    #[arg(long, global = true, default_value_t = false)]
    no_backup: bool,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Print the value(s) at a dig path of any JSON file
    Get(GetArgs),
    /// Set a raw JSON value at a dig path; prints or writes with --out
    Set(SetArgs),
    /// Print the key object for an expression like "shift + (control) + a"
    Key(KeyArgs),
    /// List profiles of the config, marking the selected one
    Profiles,
    /// List rule descriptions of the selected profile
    Rules,
    /// Select a profile by index, name, or /regex/ and save
    Select(SelectArgs),
    /// Replace the selected profile's rules with those of rule-set files
    Apply(ApplyArgs),
    /// Remove every rule of the selected profile and save
    Clear,
    /// Restore the config from its .bak file
    Restore,
}

#[derive(ClapArgs, Debug)]
struct GetArgs {
    /// JSON file to read
    file: PathBuf,
    /// Dig path, e.g. profiles[].name or devices.*.identifiers
    path: String,
}

#[derive(ClapArgs, Debug)]
struct SetArgs {
    /// JSON file to read
    file: PathBuf,
    /// Dig path, e.g. profiles.0.complex_modifications.rules
    path: String,
    /// New value as raw JSON (e.g., 123, true, "str", {"a":1})
    value: String,
    /// Create missing path segments
    #[arg(long, default_value_t = false)]
    make_path: bool,
    /// Optional output .json path to write; otherwise prints to stdout
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(ClapArgs, Debug)]
struct KeyArgs {
    /// Key expression
    expr: String,
    /// Extra modifiers, "+"-joined
    #[arg(long)]
    mods: Option<String>,
    /// Extra fields as raw JSON, merged into the result
    #[arg(long)]
    extra: Option<String>,
}

#[derive(ClapArgs, Debug)]
struct SelectArgs {
    /// Profile index, exact name, or /regex/ over names
    selector: String,
}

#[derive(ClapArgs, Debug)]
struct ApplyArgs {
    /// Rule-set files (defaults to every ~/.config/karabiner/complex_modifications/*.json)
    rulesets: Vec<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Cmd::Get(a) => cmd_get(a),
        Cmd::Set(a) => cmd_set(a, &cli.config),
        Cmd::Key(a) => cmd_key(a),
        Cmd::Profiles => cmd_profiles(&cli.config),
        Cmd::Rules => cmd_rules(&cli.config),
        Cmd::Select(a) => cmd_select(a, &cli.config),
        Cmd::Apply(a) => cmd_apply(a, &cli.config),
        Cmd::Clear => cmd_clear(&cli.config),
        Cmd::Restore => cmd_restore(&cli.config),
    }
}

fn io_options(args: &ConfigArgs) -> IoOptions {
    IoOptions {
        backup: !args.no_backup,
        ..IoOptions::default()
    }
}

fn load_config(args: &ConfigArgs) -> Config {
    let mut config = Config::new();
    config
        .set_io(args.config.as_deref(), io_options(args))
        .and_then(|c| c.load())
        .unwrap_or_else(|e| {
            eprintln!("error: {}", e);
            std::process::exit(2);
        });
    config
}

fn save_config(config: &mut Config) {
    config.save().unwrap_or_else(|e| {
        eprintln!("error writing: {}", e);
        std::process::exit(5);
    });
}

fn read_json(file: &Path) -> serde_json::Value {
    let text = FileIo::new(file, IoOptions::default())
        .read()
        .unwrap_or_else(|e| {
            eprintln!("error: {}: {}", file.display(), e);
            std::process::exit(2);
        });
    serde_json::from_str(&text).unwrap_or_else(|e| {
        eprintln!("invalid JSON in {}: {}", file.display(), e);
        std::process::exit(2);
    })
}

fn cmd_get(args: GetArgs) {
    let mut v = read_json(&args.file);
    match dig(&mut v, &args.path, &DigOptions::new()) {
        Ok(found) => println!("{}", pretty(&found.to_json())),
        Err(e) => {
            eprintln!("not found: {}: {}", args.path, e);
            std::process::exit(3);
        }
    }
}

fn cmd_set(args: SetArgs, config: &ConfigArgs) {
    let mut v = read_json(&args.file);
    let new_val: serde_json::Value = serde_json::from_str(&args.value).unwrap_or_else(|e| {
        eprintln!("invalid value JSON: {}", e);
        std::process::exit(3);
    });
    let mut opts = DigOptions::new().set(new_val);
    if args.make_path {
        opts = opts.make_path();
    }
    if let Err(e) = dig(&mut v, &args.path, &opts) {
        eprintln!("error: {}", e);
        std::process::exit(4);
    }
    if let Some(out) = args.out {
        FileIo::new(&out, io_options(config))
            .write(&pretty(&v))
            .unwrap_or_else(|e| {
                eprintln!("error writing: {}", e);
                std::process::exit(5);
            });
    } else {
        println!("{}", pretty(&v));
    }
}

fn cmd_key(args: KeyArgs) {
    let mut key = Key::parse(&args.expr);
    if let Some(mods) = args.mods {
        key = key.with_modifiers(mods);
    }
    if let Some(extra) = args.extra {
        let extra: serde_json::Value = serde_json::from_str(&extra).unwrap_or_else(|e| {
            eprintln!("invalid --extra JSON: {}", e);
            std::process::exit(3);
        });
        key = key.with_extra(extra);
    }
    println!("{}", pretty(&key.to_json()));
}

fn cmd_profiles(args: &ConfigArgs) {
    let config = load_config(args);
    let current = config.current_index().ok();
    for (i, profile) in config.profiles().iter().enumerate() {
        let name = profile
            .get("name")
            .and_then(|n| n.as_str())
            .unwrap_or("<unnamed>");
        let mark = if current == Some(i) { "*" } else { " " };
        println!("{} {}\t{}", mark, i, name);
    }
}

fn cmd_rules(args: &ConfigArgs) {
    let config = load_config(args);
    let rules = config.rules().unwrap_or_else(|e| {
        eprintln!("error: {}", e);
        std::process::exit(4);
    });
    for rule in rules {
        println!(
            "{}\t(manipulators={})",
            rule.description,
            rule.manipulators().len()
        );
    }
}

fn cmd_select(args: SelectArgs, config_args: &ConfigArgs) {
    let selector = ProfileSelector::parse(&args.selector).unwrap_or_else(|e| {
        eprintln!("error: {}", e);
        std::process::exit(3);
    });
    let mut config = load_config(config_args);
    config.select_profile(selector).unwrap_or_else(|e| {
        eprintln!("error: {}", e);
        std::process::exit(4);
    });
    save_config(&mut config);
}

fn cmd_apply(args: ApplyArgs, config_args: &ConfigArgs) {
    let files = if args.rulesets.is_empty() {
        paths::rulesets_dir()
            .map(|dir| paths::list_rulesets(&dir))
            .unwrap_or_default()
    } else {
        args.rulesets
    };
    if files.is_empty() {
        eprintln!("error: no rule-set files");
        std::process::exit(3);
    }
    let mut rules = Vec::new();
    for file in &files {
        let set = RuleSet::from_file(file, IoOptions::default()).unwrap_or_else(|e| {
            eprintln!("error: {}: {}", file.display(), e);
            std::process::exit(2);
        });
        debug!(file = %file.display(), title = %set.title, rules = set.rules().len(), "rule set loaded");
        rules.extend(set.rules().iter().cloned());
    }
    let mut config = load_config(config_args);
    config.set_rules(&rules).unwrap_or_else(|e| {
        eprintln!("error: {}", e);
        std::process::exit(4);
    });
    save_config(&mut config);
    println!("applied {} rule(s) from {} file(s)", rules.len(), files.len());
}

fn cmd_clear(args: &ConfigArgs) {
    let mut config = load_config(args);
    config.clear_rules().unwrap_or_else(|e| {
        eprintln!("error: {}", e);
        std::process::exit(4);
    });
    save_config(&mut config);
}

fn cmd_restore(args: &ConfigArgs) {
    let mut config = Config::new();
    config
        .set_io(args.config.as_deref(), io_options(args))
        .and_then(|c| c.load_backup())
        .unwrap_or_else(|e| {
            eprintln!("error reading backup: {}", e);
            std::process::exit(2);
        });
    save_config(&mut config);
}

fn pretty(v: &serde_json::Value) -> String {
    serde_json::to_string_pretty(v).unwrap_or_else(|e| {
        eprintln!("error: {}", e);
        std::process::exit(5);
    })
}
