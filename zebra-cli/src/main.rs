use zebra_core::{Category, ClueKind, Label, TargetFact};
use zebra_gen::{GenerateConfig, Seed, clue_count_bounds, generate_puzzle};

#[cfg(feature = "telemetry-subscriber")]
fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("zebra_gen=trace,zebra_solver=info,zebra_cli=info"));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

#[cfg(not(feature = "telemetry-subscriber"))]
fn init_tracing() {}

fn usage() -> &'static str {
    "zebra-cli\n\
\n\
USAGE:\n\
  zebra-cli generate --categories <FILE> [--seed <N> | --seed-text <S>]\n\
                     [--clues <T>] [--max-candidates <M>] [--timeout-ms <MS>]\n\
                     [--types <a,b,..>] [--target-cat <C> --target-value <V> --target-wanted <C2>]\n\
  zebra-cli bounds   --categories <FILE> [--target-cat <C> --target-value <V> --target-wanted <C2>]\n\
\n\
The categories file is a JSON array:\n\
  [{\"id\":\"name\",\"kind\":\"nominal\",\"values\":[\"Alice\",\"Bob\",\"Charlie\"]},\n\
   {\"id\":\"age\",\"kind\":\"ordinal\",\"values\":[20,30,40]}]\n\
\n\
Clue types: binary, ordinal, superlative, unary, cross_ordinal\n\
\n\
EXAMPLES:\n\
  zebra-cli generate --categories cats.json --seed 1234\n\
  zebra-cli generate --categories cats.json --seed 1234 --clues 4\n\
  zebra-cli bounds --categories cats.json\n"
}

fn parse_kind(s: &str) -> Option<ClueKind> {
    match s {
        "binary" => Some(ClueKind::Binary),
        "ordinal" => Some(ClueKind::Ordinal),
        "superlative" => Some(ClueKind::Superlative),
        "unary" => Some(ClueKind::Unary),
        "cross_ordinal" => Some(ClueKind::CrossOrdinal),
        _ => None,
    }
}

fn parse_label(s: &str) -> Label {
    s.parse::<i64>().map_or_else(|_| Label::from(s), Label::Int)
}

fn parse_arg_value(args: &[String], i: &mut usize) -> Result<String, String> {
    *i += 1;
    args.get(*i)
        .cloned()
        .ok_or_else(|| "missing value".to_string())
}

fn main() {
    init_tracing();
    if let Err(err) = run() {
        eprintln!("{err}\n\n{}", usage());
        std::process::exit(2);
    }
}

fn run() -> Result<(), String> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        return Err("missing command".to_string());
    }

    let cmd = args[1].as_str();
    let mut categories_path: Option<String> = None;
    let mut config = GenerateConfig::default();
    let mut target_cat: Option<String> = None;
    let mut target_value: Option<Label> = None;
    let mut target_wanted: Option<String> = None;

    let mut i = 2usize;
    while i < args.len() {
        match args[i].as_str() {
            "--categories" | "-c" => {
                categories_path = Some(parse_arg_value(&args, &mut i)?);
            }
            "--seed" => {
                let v = parse_arg_value(&args, &mut i)?;
                let seed = v.parse::<u32>().map_err(|_| "invalid --seed".to_string())?;
                config.seed = Some(Seed::Value(seed));
            }
            "--seed-text" => {
                config.seed = Some(Seed::Text(parse_arg_value(&args, &mut i)?));
            }
            "--clues" => {
                let v = parse_arg_value(&args, &mut i)?;
                config.target_clue_count =
                    Some(v.parse::<usize>().map_err(|_| "invalid --clues".to_string())?);
            }
            "--max-candidates" => {
                let v = parse_arg_value(&args, &mut i)?;
                config.max_candidates = Some(
                    v.parse::<usize>()
                        .map_err(|_| "invalid --max-candidates".to_string())?,
                );
            }
            "--timeout-ms" => {
                let v = parse_arg_value(&args, &mut i)?;
                config.timeout_ms = Some(
                    v.parse::<u64>()
                        .map_err(|_| "invalid --timeout-ms".to_string())?,
                );
            }
            "--types" => {
                let v = parse_arg_value(&args, &mut i)?;
                let kinds = v
                    .split(',')
                    .map(|s| parse_kind(s.trim()).ok_or_else(|| format!("unknown clue type: {s}")))
                    .collect::<Result<Vec<_>, _>>()?;
                config.allowed_clue_types = Some(kinds);
            }
            "--target-cat" => {
                target_cat = Some(parse_arg_value(&args, &mut i)?);
            }
            "--target-value" => {
                target_value = Some(parse_label(&parse_arg_value(&args, &mut i)?));
            }
            "--target-wanted" => {
                target_wanted = Some(parse_arg_value(&args, &mut i)?);
            }
            "--help" | "-h" => {
                println!("{}", usage());
                return Ok(());
            }
            other => {
                return Err(format!("unknown arg: {other}"));
            }
        }
        i += 1;
    }

    let Some(path) = categories_path else {
        return Err("missing required flag: --categories".to_string());
    };
    let raw = std::fs::read_to_string(&path).map_err(|e| format!("cannot read {path}: {e}"))?;
    let categories: Vec<Category> =
        serde_json::from_str(&raw).map_err(|e| format!("cannot parse {path}: {e}"))?;

    let target = match (target_cat, target_value, target_wanted) {
        (None, None, None) => None,
        (Some(cat), Some(value), Some(wanted)) => Some(TargetFact {
            cat,
            value,
            wanted,
        }),
        _ => {
            return Err(
                "--target-cat, --target-value and --target-wanted go together".to_string(),
            );
        }
    };

    match cmd {
        "generate" => {
            let puzzle =
                generate_puzzle(categories, target, config).map_err(|e| e.to_string())?;
            let json = serde_json::to_string_pretty(&puzzle).map_err(|e| e.to_string())?;
            println!("{json}");
        }
        "bounds" => {
            let bounds = clue_count_bounds(categories, target).map_err(|e| e.to_string())?;
            println!("min={} max={}", bounds.min, bounds.max);
        }
        _ => {
            return Err(format!("unknown command: {cmd}"));
        }
    }

    Ok(())
}
