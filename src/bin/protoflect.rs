//! protoflect CLI — schema-driven inspection of proto3 payloads.
//!
//! Works against an exported schema module (`export_module`): dump the
//! schema, decode a payload into JSON, or encode JSON back into wire bytes.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use clap::{Args, Parser, Subcommand};
use protoflect::{Kind, MapKey, Module, Tree, Type, Value};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "protoflect", about = "Inspect proto3 payloads against an exported schema")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Dump an exported schema module as JSON
    Schema(SchemaArgs),
    /// Decode a payload into a JSON tree
    Read(ReadArgs),
    /// Encode a JSON tree into wire bytes
    Write(WriteArgs),
}

#[derive(Args)]
struct SchemaArgs {
    /// Path to the exported module blob
    schema: PathBuf,
}

#[derive(Args)]
struct ReadArgs {
    /// Path to the exported module blob
    #[arg(long)]
    schema: PathBuf,

    /// Type name the payload was encoded under
    #[arg(long = "type")]
    type_name: String,

    /// Payload file (stdin when omitted)
    input: Option<PathBuf>,
}

#[derive(Args)]
struct WriteArgs {
    /// Path to the exported module blob
    #[arg(long)]
    schema: PathBuf,

    /// Type name to encode under
    #[arg(long = "type")]
    type_name: String,

    /// JSON file (stdin when omitted)
    input: Option<PathBuf>,

    /// Output file (stdout when omitted)
    #[arg(long, short)]
    output: Option<PathBuf>,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    let result = match cli.command {
        Command::Schema(args) => run_schema(&args),
        Command::Read(args) => run_read(&args),
        Command::Write(args) => run_write(&args),
    };
    if let Err(message) = result {
        eprintln!("protoflect: {message}");
        process::exit(1);
    }
}

fn load_module(path: &Path) -> Result<Module, String> {
    let blob =
        std::fs::read(path).map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    let module = protoflect::import_module(&blob).map_err(|e| e.to_string())?;
    protoflect::register_module(&module);
    Ok(module)
}

fn read_input(path: Option<&PathBuf>) -> Result<Vec<u8>, String> {
    match path {
        Some(path) => {
            std::fs::read(path).map_err(|e| format!("cannot read {}: {e}", path.display()))
        }
        None => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .map_err(|e| format!("cannot read stdin: {e}"))?;
            Ok(buf)
        }
    }
}

fn run_schema(args: &SchemaArgs) -> Result<(), String> {
    let module = load_module(&args.schema)?;
    let mut types = serde_json::Map::new();
    for (name, t) in &module.types {
        let fields: Vec<serde_json::Value> = t
            .fields
            .iter()
            .map(|f| {
                serde_json::json!({
                    "name": f.name,
                    "kind": f.kind.name(),
                    "field_num": f.field_num(),
                    "wire_type": f.declared_wire().num(),
                })
            })
            .collect();
        types.insert(name.clone(), serde_json::json!({ "fields": fields }));
    }
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::Value::Object(types))
            .map_err(|e| e.to_string())?
    );
    Ok(())
}

fn run_read(args: &ReadArgs) -> Result<(), String> {
    load_module(&args.schema)?;
    let payload = read_input(args.input.as_ref())?;
    let tree = protoflect::read(&args.type_name, &payload).map_err(|e| e.to_string())?;
    let json = tree_to_json(&tree);
    println!(
        "{}",
        serde_json::to_string_pretty(&json).map_err(|e| e.to_string())?
    );
    Ok(())
}

fn run_write(args: &WriteArgs) -> Result<(), String> {
    load_module(&args.schema)?;
    let text = read_input(args.input.as_ref())?;
    let json: serde_json::Value =
        serde_json::from_slice(&text).map_err(|e| format!("invalid JSON: {e}"))?;
    let typ = protoflect::capture_type_by_name(&args.type_name)
        .ok_or_else(|| format!("unknown type '{}'", args.type_name))?;
    let tree = tree_from_json(&typ, &json)?;
    let bytes = protoflect::write(&args.type_name, &tree).map_err(|e| e.to_string())?;
    match &args.output {
        Some(path) => std::fs::write(path, &bytes)
            .map_err(|e| format!("cannot write {}: {e}", path.display()))?,
        None => std::io::stdout()
            .write_all(&bytes)
            .map_err(|e| format!("cannot write stdout: {e}"))?,
    }
    Ok(())
}

// ============================================================================
// Value tree ↔ JSON
// ============================================================================

fn tree_to_json(tree: &Tree) -> serde_json::Value {
    let mut out = serde_json::Map::new();
    for (name, value) in tree {
        out.insert(name.clone(), value_to_json(value));
    }
    serde_json::Value::Object(out)
}

fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::None => serde_json::Value::Null,
        Value::I64(v) => serde_json::json!(v),
        Value::U64(v) => serde_json::json!(v),
        // Nicht-finite Floats haben keine JSON-Zahl — als String ausgeben.
        Value::F64(v) if v.is_finite() => serde_json::json!(v),
        Value::F64(v) => serde_json::json!(v.to_string()),
        Value::Bool(v) => serde_json::json!(v),
        Value::Str(v) => serde_json::json!(v),
        Value::Bytes(v) => serde_json::json!(BASE64.encode(v)),
        Value::List(items) => serde_json::Value::Array(items.iter().map(value_to_json).collect()),
        Value::Map(map) => {
            let mut out = serde_json::Map::new();
            for (key, val) in map {
                out.insert(map_key_string(key), value_to_json(val));
            }
            serde_json::Value::Object(out)
        }
        Value::Message(tree) => tree_to_json(tree),
    }
}

fn map_key_string(key: &MapKey) -> String {
    match key {
        MapKey::I64(v) => v.to_string(),
        MapKey::U64(v) => v.to_string(),
        MapKey::Bool(v) => v.to_string(),
        MapKey::Str(v) => v.clone(),
        MapKey::Bytes(v) => BASE64.encode(v),
    }
}

fn tree_from_json(typ: &Type, json: &serde_json::Value) -> Result<Tree, String> {
    let serde_json::Value::Object(object) = json else {
        return Err(format!("type '{}' expects a JSON object", typ.name));
    };
    let mut tree = Tree::default();
    for (name, entry) in object {
        let Some(field) = typ.fields.iter().find(|f| &f.name == name) else {
            return Err(format!("type '{}' has no field '{name}'", typ.name));
        };
        tree.insert(name.clone(), value_from_json(field.kind, field, entry)?);
    }
    Ok(tree)
}

fn value_from_json(
    kind: Kind,
    field: &protoflect::Field,
    json: &serde_json::Value,
) -> Result<Value, String> {
    let mismatch = |expected: &str| format!("field '{}' expects {expected}, got {json}", field.name);
    match kind {
        k if k.is_signed_int() => json
            .as_i64()
            .map(Value::I64)
            .ok_or_else(|| mismatch("a signed integer")),
        k if k.is_unsigned_int() => json
            .as_u64()
            .map(Value::U64)
            .ok_or_else(|| mismatch("an unsigned integer")),
        Kind::Float32 | Kind::Float64 => json
            .as_f64()
            .map(Value::F64)
            .ok_or_else(|| mismatch("a number")),
        Kind::Bool => json.as_bool().map(Value::Bool).ok_or_else(|| mismatch("a bool")),
        Kind::String => json
            .as_str()
            .map(|s| Value::Str(s.to_string()))
            .ok_or_else(|| mismatch("a string")),
        Kind::Bytes => {
            let text = json.as_str().ok_or_else(|| mismatch("a base64 string"))?;
            BASE64
                .decode(text)
                .map(Value::Bytes)
                .map_err(|e| format!("field '{}': invalid base64: {e}", field.name))
        }
        Kind::List => {
            let serde_json::Value::Array(items) = json else {
                return Err(mismatch("an array"));
            };
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(element_from_json(field.elem, &field.elem_type, field, item)?);
            }
            Ok(Value::List(out))
        }
        Kind::Map => {
            let serde_json::Value::Object(entries) = json else {
                return Err(mismatch("an object"));
            };
            let mut out = protoflect::FastIndexMap::default();
            for (key_text, val) in entries {
                let key = map_key_from_text(field.key, key_text)
                    .ok_or_else(|| format!("field '{}': bad map key '{key_text}'", field.name))?;
                out.insert(
                    key,
                    element_from_json(field.elem, &field.elem_type, field, val)?,
                );
            }
            Ok(Value::Map(out))
        }
        Kind::Message => {
            let nested = protoflect::capture_type_by_name(&field.type_name)
                .ok_or_else(|| format!("unknown nested type '{}'", field.type_name))?;
            Ok(Value::Message(tree_from_json(&nested, json)?))
        }
        _ => Err(mismatch("nothing (invalid kind)")),
    }
}

fn element_from_json(
    kind: Kind,
    type_name: &str,
    field: &protoflect::Field,
    json: &serde_json::Value,
) -> Result<Value, String> {
    if kind == Kind::Message {
        let nested = protoflect::capture_type_by_name(type_name)
            .ok_or_else(|| format!("unknown nested type '{type_name}'"))?;
        return Ok(Value::Message(tree_from_json(&nested, json)?));
    }
    value_from_json(kind, field, json)
}

fn map_key_from_text(kind: Kind, text: &str) -> Option<MapKey> {
    match kind {
        k if k.is_signed_int() => text.parse().ok().map(MapKey::I64),
        k if k.is_unsigned_int() => text.parse().ok().map(MapKey::U64),
        Kind::Bool => text.parse().ok().map(MapKey::Bool),
        Kind::String => Some(MapKey::Str(text.to_string())),
        Kind::Bytes => BASE64.decode(text).ok().map(MapKey::Bytes),
        _ => None,
    }
}
