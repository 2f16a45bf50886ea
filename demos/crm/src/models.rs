//! The demo's models: customers with a customised changelist and schools
//! with the default one.

use std::sync::Arc;

use thanos::prelude::*;

/// Customer records.
pub fn customer() -> ModelMeta {
    ModelMeta::new("crm", "customer")
        .field(FieldDef::new("name", FieldType::CharField).max_length(64))
        .field(
            FieldDef::new("email", FieldType::EmailField)
                .max_length(128)
                .blank(),
        )
        .field(FieldDef::new("city", FieldType::CharField).max_length(64))
        .field(
            FieldDef::new("status", FieldType::CharField)
                .max_length(16)
                .default("lead")
                .choices([("lead", "Lead"), ("active", "Active"), ("lost", "Lost")]),
        )
        .field(FieldDef::new("vip", FieldType::BooleanField).default(false))
        .field(FieldDef::new("joined", FieldType::DateField).nullable())
        .str_field("name")
}

/// School records.
pub fn school() -> ModelMeta {
    ModelMeta::new("edu", "school")
        .field(FieldDef::new("title", FieldType::CharField).max_length(100))
        .field(FieldDef::new("students", FieldType::IntegerField).default(0))
        .str_field("title")
}

/// The customer console: listed columns, a badge column, the add button,
/// and a JSON summary at `stats/`.
pub fn customer_config(meta: Arc<ModelMeta>) -> CrmConfig {
    CrmConfig::new(meta)
        .with_list_display([
            ListColumn::from("name"),
            ListColumn::from("city"),
            ListColumn::from("status"),
            ListColumn::custom(vip_badge),
        ])
        .with_add_btn(true)
        .with_list_per_page(5)
        .with_model_form(
            ModelFormConfig::new()
                .with_label("vip", "VIP")
                .with_help_text("email", "Used for invoices."),
        )
        .with_extra_route("stats/", "stats", |ctx, _request| {
            Box::pin(async move {
                let meta = ctx.config.meta();
                let total = ctx.store.count(meta, &Filter::all()).await?;
                let vip = ctx
                    .store
                    .count(meta, &Filter::all().and("vip", true))
                    .await?;
                Ok::<_, ThanosError>(JsonResponse::new(&serde_json::json!({
                    "total": total,
                    "vip": vip,
                })))
            })
        })
}

fn vip_badge(_ctx: &RenderContext<'_>, record: Option<&Record>) -> ThanosResult<String> {
    Ok(match record {
        None => "VIP".to_string(),
        Some(record) if record.get("vip") == Some(&Value::Bool(true)) => {
            r#"<span class="badge">&#9733;</span>"#.to_string()
        }
        Some(_) => String::new(),
    })
}

/// Registers the demo models.
pub fn build_site() -> CrmSite {
    let mut site = CrmSite::new();
    site.register_with(customer(), customer_config);
    site.register(school());
    site
}

/// Fills `store` with sample records.
pub async fn seed(store: &dyn ModelStore) -> ThanosResult<()> {
    let customer = customer();
    let cities = ["Oslo", "Lima", "Porto", "Kyoto"];
    let statuses = ["lead", "active", "lost"];
    for i in 0..23 {
        store
            .create(
                &customer,
                Record::new()
                    .with("name", format!("Customer {}", i + 1))
                    .with("email", format!("customer{}@example.com", i + 1))
                    .with("city", cities[i % cities.len()])
                    .with("status", statuses[i % statuses.len()])
                    .with("vip", i % 5 == 0),
            )
            .await?;
    }

    let school = school();
    for (title, students) in [("Northside High", 812), ("Harbor Academy", 430)] {
        store
            .create(
                &school,
                Record::new()
                    .with("title", title)
                    .with("students", students),
            )
            .await?;
    }
    tracing::info!("demo data seeded");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_site_registers_both_models() {
        let site = build_site();
        assert_eq!(site.registered_models(), vec!["crm.customer", "edu.school"]);
        assert!(site.get("crm.customer").unwrap().show_add_btn());
        assert!(!site.get("edu.school").unwrap().show_add_btn());
    }

    #[test]
    fn test_stats_route_is_named() {
        let urls = build_site().url_table("/thanos").unwrap();
        assert_eq!(
            urls.reverse("crm_customer_stats", &[]).unwrap(),
            "/thanos/crm/customer/stats/"
        );
    }

    #[tokio::test]
    async fn test_seed() {
        let store = InMemoryStore::new();
        seed(&store).await.unwrap();
        assert_eq!(store.count(&customer(), &Filter::all()).await.unwrap(), 23);
        assert_eq!(store.count(&school(), &Filter::all()).await.unwrap(), 2);
        let vip = Filter::all().and("vip", true);
        assert_eq!(store.count(&customer(), &vip).await.unwrap(), 5);
    }
}
