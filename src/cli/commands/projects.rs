use clap::{Args, Subcommand};
use serde_json::{json, Map, Value};

use crate::cli::client::ApiClient;
use crate::cli::utils::*;
use crate::cli::OutputFormat;

#[derive(Args, Debug, Default)]
pub struct ProjectFields {
    #[arg(long, help = "Project title")]
    pub title: Option<String>,
    #[arg(long, help = "Short description")]
    pub description: Option<String>,
    #[arg(long, help = "Project URL")]
    pub url: Option<String>,
    #[arg(long, help = "Cover image URL")]
    pub image_url: Option<String>,
    #[arg(long, help = "Comma-separated technologies")]
    pub tech_stack: Option<String>,
    #[arg(long, help = "Feature on the home page (true/false)")]
    pub featured: Option<bool>,
    #[arg(long, help = "URL slug (derived from the title when omitted)")]
    pub slug: Option<String>,
}

#[derive(Subcommand)]
pub enum ProjectCommands {
    #[command(about = "List projects in display order")]
    List {
        #[arg(long, help = "Only featured projects")]
        featured: bool,
    },

    #[command(about = "Create a project")]
    Create {
        #[command(flatten)]
        fields: ProjectFields,
    },

    #[command(about = "Update a project; only the given fields change")]
    Update {
        #[arg(help = "Project ID")]
        id: String,
        #[command(flatten)]
        fields: ProjectFields,
        #[arg(long, help = "Explicit position among featured projects", conflicts_with = "clear_sort_order")]
        sort_order: Option<i32>,
        #[arg(long, help = "Remove the explicit position")]
        clear_sort_order: bool,
    },

    #[command(about = "Delete a project")]
    Delete {
        #[arg(help = "Project ID")]
        id: String,
    },
}

impl ProjectFields {
    /// JSON body holding only the fields that were given.
    pub fn to_body(&self) -> Map<String, Value> {
        let mut body = Map::new();
        let text = [
            ("title", &self.title),
            ("description", &self.description),
            ("url", &self.url),
            ("image_url", &self.image_url),
            ("tech_stack", &self.tech_stack),
            ("slug", &self.slug),
        ];
        for (name, value) in text {
            if let Some(value) = value {
                body.insert(name.to_string(), Value::String(value.clone()));
            }
        }
        if let Some(featured) = self.featured {
            body.insert("featured".to_string(), Value::Bool(featured));
        }
        body
    }
}

pub fn update_body(id: &str, fields: &ProjectFields, sort_order: Option<i32>, clear_sort_order: bool) -> Value {
    let mut body = fields.to_body();
    body.insert("id".to_string(), Value::String(id.to_string()));
    if clear_sort_order {
        body.insert("sort_order".to_string(), Value::Null);
    } else if let Some(order) = sort_order {
        body.insert("sort_order".to_string(), json!(order));
    }
    Value::Object(body)
}

fn print_projects(projects: &Value) {
    println!("{:<38} {:<24} {:<8} {:<5} {}", "ID", "SLUG", "FEATURED", "ORDER", "TITLE");
    println!("{}", "-".repeat(100));
    for project in projects.as_array().into_iter().flatten() {
        let field = |name: &str| project.get(name).and_then(Value::as_str).unwrap_or_default().to_string();
        let featured = project.get("featured").and_then(Value::as_bool).unwrap_or(false);
        let order = project
            .get("sort_order")
            .and_then(Value::as_i64)
            .map(|o| o.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<38} {:<24} {:<8} {:<5} {}",
            field("id"),
            preview(&field("slug"), 24),
            if featured { "yes" } else { "" },
            order,
            field("title")
        );
    }
}

pub async fn handle(cmd: ProjectCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let client = ApiClient::from_config()?;

    match cmd {
        ProjectCommands::List { featured } => {
            let path = if featured { "/api/projects?featured=true" } else { "/api/projects" };
            let body = client.get(path).await?;
            let projects = body.get("data").cloned().unwrap_or_else(|| json!([]));

            if projects.as_array().map_or(true, Vec::is_empty) {
                return output_empty_collection(&output_format, "projects", "No projects");
            }
            output_value(&output_format, &projects, print_projects)
        }
        ProjectCommands::Create { fields } => {
            if fields.title.as_deref().map_or(true, |t| t.trim().is_empty()) {
                return Err(anyhow::anyhow!("--title is required"));
            }
            let body = client.post("/api/projects/create", &Value::Object(fields.to_body())).await?;
            let project = body.get("data").cloned().unwrap_or(Value::Null);
            let slug = project.get("slug").and_then(Value::as_str).unwrap_or_default().to_string();
            output_success(
                &output_format,
                &format!("Created project '{}'", slug),
                Some(json!({ "project": project })),
            )
        }
        ProjectCommands::Update {
            id,
            fields,
            sort_order,
            clear_sort_order,
        } => {
            let request = update_body(&id, &fields, sort_order, clear_sort_order);
            let body = client.post("/api/projects/update", &request).await?;
            output_success(
                &output_format,
                &format!("Updated project {}", id),
                Some(json!({ "project": body.get("data") })),
            )
        }
        ProjectCommands::Delete { id } => {
            client.post("/api/projects/delete", &json!({ "id": id })).await?;
            output_success(&output_format, &format!("Deleted project {}", id), Some(json!({ "id": id })))
        }
    }
}
