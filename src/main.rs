use anyhow::Context;
use clap::Parser;
use content_model::config::cli::{parse_assignments, parse_record_id, parse_value};
use content_model::config::Command;
use content_model::utils::{logger, validation::Validate};
use content_model::{CliConfig, ContentModel, FindArgs, Found, ModelClass, QueryType};
use serde_json::Value;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    if let Err(e) = cli.validate() {
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    let config = cli.app_config().context("loading configuration")?;
    if config.json_logs() {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose, config.log_level());
    }

    tracing::info!("Starting content-model CLI");
    tracing::debug!("CLI config: {:?}", cli);

    let store = config.open_store().await.context("opening store")?;
    let class = ModelClass::named(store, cli.type_name.clone());

    let output = match run(&class, &cli.command, config.query_type(), config.sort_order()).await {
        Ok(output) => output,
        Err(e) => {
            tracing::error!("❌ {} failed: {}", class.type_name(), e);
            eprintln!("❌ {}", e);
            std::process::exit(if e.is_state_error() { 2 } else { 1 });
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

async fn run(
    class: &ModelClass,
    command: &Command,
    default_query_type: QueryType,
    default_sort_order: Option<content_model::SortOrder>,
) -> content_model::Result<Value> {
    match command {
        Command::Find { id } => {
            let found = class
                .find(
                    FindArgs::Id(parse_record_id(id)),
                    default_query_type,
                    None,
                    None,
                )
                .await?;
            Ok(found_to_json(found))
        }
        Command::Where {
            conditions,
            or,
            sort,
            order,
        } => {
            let query_type = if *or { QueryType::Or } else { default_query_type };
            let found = class
                .find(
                    parse_assignments(conditions)?,
                    query_type,
                    sort.as_deref(),
                    order.or(default_sort_order),
                )
                .await?;
            Ok(found_to_json(found))
        }
        Command::Call { method, args } => {
            let args: Vec<Value> = args.iter().map(|raw| parse_value(raw)).collect();
            let found = class.call(method, &args).await?;
            Ok(found_to_json(found))
        }
        Command::Create { fields } => {
            let model = class.create(parse_assignments(fields)?).await?;
            tracing::info!("✅ Created {} record", class.type_name());
            Ok(model_to_json(&model))
        }
        Command::Update { id, fields } => {
            let mut model = class.find_by_id(parse_record_id(id)).await?;
            model.update(parse_assignments(fields)?).await?;
            tracing::info!("✅ Updated {} record {}", class.type_name(), id);
            Ok(model_to_json(&model))
        }
        Command::Delete { id } => {
            let mut model = class.find_by_id(parse_record_id(id)).await?;
            model.delete().await?;
            tracing::info!("✅ Deleted {} record {}", class.type_name(), id);
            Ok(serde_json::json!({ "deleted": id }))
        }
    }
}

fn model_to_json(model: &ContentModel) -> Value {
    Value::Object(model.get_values())
}

fn found_to_json(found: Found) -> Value {
    match found {
        Found::One(model) => model_to_json(&model),
        Found::Many(models) => Value::Array(models.iter().map(model_to_json).collect()),
    }
}
