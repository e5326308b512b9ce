//! Built-in tools: current time, spending history, dataset search, and
//! simulated purchase. Behavior mirrors the original Harmony agent.

use serde_json::json;

use crate::market::LedgerEntry;
use crate::session::ConversationState;
use crate::ToolDefinition;

use super::{ToolError, ToolRegistry};

/// Registry with the full built-in tool set.
pub fn builtin_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();

    registry.register(
        ToolDefinition {
            name: "get_current_time".into(),
            description: "Get the current date and time.".into(),
            parameters: json!({
                "type": "object",
                "properties": {},
                "required": [],
            }),
        },
        Box::new(|_state, _args| {
            let now = chrono::Local::now().format("%B %d, %Y at %I:%M %p");
            Ok(format!("The current date and time is {now}."))
        }),
    );

    registry.register(
        ToolDefinition {
            name: "view_spending_history".into(),
            description: "View the user's recent spending history.".into(),
            parameters: json!({
                "type": "object",
                "properties": {},
                "required": [],
            }),
        },
        Box::new(|state, _args| Ok(render_spending_history(state))),
    );

    registry.register(
        ToolDefinition {
            name: "search_datasets".into(),
            description: "Search available datasets by domain, e.g. 'machine learning' or 'nlp'."
                .into(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "domain": {
                        "type": "string",
                        "description": "Domain to search",
                    },
                },
                "required": ["domain"],
            }),
        },
        Box::new(|state, args| {
            let domain = required_str(args, "domain", "search_datasets")?;
            Ok(render_search(state, &domain))
        }),
    );

    registry.register(
        ToolDefinition {
            name: "simulate_purchase".into(),
            description: "Simulate purchasing a dataset after user confirmation.".into(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "dataset_id": {
                        "type": "string",
                        "description": "The dataset ID to purchase",
                    },
                },
                "required": ["dataset_id"],
            }),
        },
        Box::new(|state, args| {
            let dataset_id = required_str(args, "dataset_id", "simulate_purchase")?;
            Ok(purchase(state, &dataset_id))
        }),
    );

    registry
}

fn required_str(
    args: &serde_json::Value,
    field: &str,
    tool: &str,
) -> Result<String, ToolError> {
    args.get(field)
        .and_then(|v| v.as_str())
        .map(String::from)
        .ok_or_else(|| ToolError::Validation {
            tool: tool.to_string(),
            reason: format!("missing string field '{field}'"),
        })
}

fn render_spending_history(state: &ConversationState) -> String {
    let ledger = state.ledger();
    let mut response = String::from("Here is your recent spending history:\n\n");
    for entry in ledger.entries() {
        response.push_str(&format!(
            "* {} - {} MNEE ({})\n",
            entry.item, entry.cost_units, entry.when
        ));
    }
    response.push_str(&format!(
        "\nTotal spent recently: {} MNEE.",
        ledger.total_units()
    ));
    response
}

fn render_search(state: &ConversationState, domain: &str) -> String {
    // Domain matching and echoing are both case-insensitive.
    let domain = domain.to_lowercase();
    let market = state.marketplace();
    let Some(results) = market.search(&domain) else {
        return format!(
            "No datasets found for '{}'. Available domains are: {}.",
            domain,
            market.domains().join(", ")
        );
    };

    let mut response = format!("Found {} datasets in {}:\n\n", results.len(), domain);
    for ds in results {
        response.push_str(&format!(
            "* {}\n  Provider: {}\n  Cost: {} MNEE\n  Description: {}\n  ID: {}\n\n",
            ds.name, ds.provider, ds.price_units, ds.description, ds.id
        ));
    }
    response
}

fn purchase(state: &mut ConversationState, dataset_id: &str) -> String {
    let Some(listing) = state.marketplace().find_by_id(dataset_id).cloned() else {
        return "I couldn't find that dataset ID. Please search again.".into();
    };

    state.ledger_mut().record(LedgerEntry {
        item: listing.name.clone(),
        cost_units: listing.price_units,
        when: "Today".into(),
    });

    format!(
        "\u{2713} Purchase simulated successfully.\n\nDataset: {}\nCost: {} MNEE\n\n\
         I've recorded this in your spending history.",
        listing.name, listing.price_units
    )
}
