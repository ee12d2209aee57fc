use anyhow::{Result, bail};
use std::process;

use crate::openfoodfacts::OpenFoodFactsClient;
use pantry_core::models::NewIngredient;
use pantry_core::service::PantryService;

use super::helpers::{
    IngredientView, display_date, parse_date, print_ingredient_table, report_not_found, today,
};

pub(crate) async fn cmd_scan(
    svc: &PantryService,
    off: &OpenFoodFactsClient,
    barcode: &str,
    name: Option<&str>,
    expires: Option<&str>,
    quantity: Option<u8>,
    json: bool,
) -> Result<()> {
    let Some(mut ingredient) = off.lookup_barcode_async(barcode.trim()).await? else {
        report_not_found(&format!("No product found for barcode {barcode}"), json);
        process::exit(2);
    };

    if let Some(name) = name {
        ingredient = ingredient.with_name(name);
        ingredient.add_possible_name(name);
    }
    if ingredient.name.trim().is_empty() {
        bail!("Product {barcode} has no category to name it by. Pass --name");
    }
    if expires.is_some() {
        ingredient.expiration_date = parse_date(expires)?;
    }
    if let Some(q) = quantity {
        ingredient.quantity = q.to_string();
    }

    if !svc.ingredient_add(&ingredient)? {
        bail!(
            "Barcode {} is already in the pantry. Use `pantry edit {}` to change it",
            ingredient.id,
            ingredient.id
        );
    }

    if json {
        let view = IngredientView::new(&ingredient, today());
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        println!(
            "Added {} (id: {}, expires {})",
            ingredient.name,
            ingredient.id,
            display_date(ingredient.expiration_date)
        );
        if ingredient.possible_names.len() > 1 {
            println!("  Also known as: {}", ingredient.possible_names.join(", "));
        }
    }
    Ok(())
}

pub(crate) fn cmd_add(
    svc: &PantryService,
    name: &str,
    expires: &str,
    quantity: u8,
    aliases: &[String],
    json: bool,
) -> Result<()> {
    let name = name.trim();
    if name.is_empty() {
        bail!("Ingredient name cannot be empty");
    }
    let ingredient = svc.ingredient_create(NewIngredient {
        name: name.to_string(),
        possible_names: aliases.to_vec(),
        add_date: today(),
        expiration_date: parse_date(Some(expires))?,
        quantity: quantity.to_string(),
    })?;

    if json {
        let view = IngredientView::new(&ingredient, today());
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        println!(
            "Added {} (id: {}, expires {})",
            ingredient.name,
            ingredient.id,
            display_date(ingredient.expiration_date)
        );
    }
    Ok(())
}

pub(crate) fn cmd_list(svc: &PantryService, json: bool) -> Result<()> {
    let ingredients = svc.ingredient_get_all()?;
    let today = today();

    if ingredients.is_empty() {
        if json {
            println!("[]");
        } else {
            eprintln!("The pantry is empty. Use `pantry scan` or `pantry add` to stock it.");
        }
        process::exit(2);
    }

    if json {
        let views: Vec<IngredientView> = ingredients
            .iter()
            .map(|ing| IngredientView::new(ing, today))
            .collect();
        println!("{}", serde_json::to_string_pretty(&views)?);
    } else {
        print_ingredient_table(&ingredients, today);
    }
    Ok(())
}

pub(crate) fn cmd_edit(
    svc: &PantryService,
    id: i64,
    name: Option<&str>,
    aliases: &[String],
    expires: Option<&str>,
    quantity: Option<u8>,
    json: bool,
) -> Result<()> {
    let Some(old) = svc.ingredient_get(id)? else {
        report_not_found(&format!("No ingredient with id {id}"), json);
        process::exit(2);
    };

    let mut edited = old.clone();
    if let Some(name) = name {
        let name = name.trim();
        if name.is_empty() {
            bail!("Ingredient name cannot be empty");
        }
        edited = edited.with_name(name);
    }
    for alias in aliases {
        edited.add_possible_name(alias);
    }
    if expires.is_some() {
        edited.expiration_date = parse_date(expires)?;
        // A new date restarts the warning cycle.
        if edited.expiration_date != old.expiration_date {
            edited.last_notified = None;
        }
    }
    if let Some(q) = quantity {
        edited.quantity = q.to_string();
    }

    svc.ingredient_replace(&old, &edited)?;

    if json {
        let view = IngredientView::new(&edited, today());
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        println!(
            "Updated {} (qty: {}, expires {})",
            edited.name,
            edited.quantity,
            display_date(edited.expiration_date)
        );
    }
    Ok(())
}

pub(crate) fn cmd_remove(svc: &PantryService, id: i64, json: bool) -> Result<()> {
    let ingredient = svc.ingredient_get(id)?;
    match ingredient {
        Some(ing) if svc.ingredient_remove(id)? => {
            if json {
                println!("{}", serde_json::json!({ "removed": ing.id, "name": ing.name }));
            } else {
                println!("Removed {} (id: {})", ing.name, ing.id);
            }
            Ok(())
        }
        _ => {
            report_not_found(&format!("No ingredient with id {id}"), json);
            process::exit(2);
        }
    }
}

pub(crate) fn cmd_clear(svc: &PantryService, favourites: bool, json: bool) -> Result<()> {
    let ingredients = svc.ingredient_clear()?;
    let recipes = if favourites { svc.recipe_clear()? } else { 0 };

    if json {
        println!(
            "{}",
            serde_json::json!({ "ingredients_removed": ingredients, "recipes_removed": recipes })
        );
    } else if favourites {
        println!("Removed {ingredients} ingredient(s) and {recipes} favourite(s)");
    } else {
        println!("Removed {ingredients} ingredient(s)");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pantry_core::models::Ingredient;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SOY_SAUCE: i64 = 8_715_035_110_106;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn pantry_with_soy_sauce() -> PantryService {
        let svc = PantryService::new_in_memory().unwrap();
        let ing = Ingredient::new(SOY_SAUCE, "condiment", date(2024, 3, 1), date(2030, 3, 10), "150");
        svc.ingredient_add(&ing).unwrap();
        svc
    }

    fn stored(svc: &PantryService) -> Ingredient {
        svc.ingredient_get(SOY_SAUCE).unwrap().unwrap()
    }

    async fn product_server(categories: serde_json::Value) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/product/8715035110106"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": "8715035110106",
                "status": 1,
                "product": {
                    "categories_tags": categories,
                    "expiration_date": "2030-05-01",
                    "quantity": "150 ml"
                }
            })))
            .mount(&server)
            .await;
        server
    }

    #[test]
    fn test_edit_name_keeps_quantity() {
        let svc = pantry_with_soy_sauce();
        cmd_edit(&svc, SOY_SAUCE, Some("Soy"), &[], None, None, true).unwrap();

        let after = stored(&svc);
        assert_eq!(after.name, "Soy");
        assert_eq!(after.quantity, "150");
        assert_eq!(after.expiration_date, date(2030, 3, 10));
    }

    #[test]
    fn test_edit_sets_quantity() {
        let svc = pantry_with_soy_sauce();
        cmd_edit(&svc, SOY_SAUCE, None, &[], None, Some(3), true).unwrap();
        assert_eq!(stored(&svc).quantity, "3");
    }

    #[test]
    fn test_edit_appends_aliases() {
        let svc = pantry_with_soy_sauce();
        let aliases = vec![
            "soy sauce".to_string(),
            "condiment".to_string(),
            "  ".to_string(),
        ];
        cmd_edit(&svc, SOY_SAUCE, None, &aliases, None, None, true).unwrap();
        assert_eq!(stored(&svc).possible_names, vec!["condiment", "soy sauce"]);
    }

    #[test]
    fn test_edit_new_expiry_restarts_warnings() {
        let svc = pantry_with_soy_sauce();
        let old = stored(&svc);
        svc.ingredient_replace(&old, &old.clone().with_last_notified(date(2030, 3, 3)))
            .unwrap();

        // Same date keeps the warning state
        cmd_edit(&svc, SOY_SAUCE, None, &[], Some("10/03/2030"), None, true).unwrap();
        assert_eq!(stored(&svc).last_notified, Some(date(2030, 3, 3)));

        cmd_edit(&svc, SOY_SAUCE, None, &[], Some("2031-01-01"), None, true).unwrap();
        let after = stored(&svc);
        assert_eq!(after.expiration_date, date(2031, 1, 1));
        assert!(after.last_notified.is_none());
    }

    #[test]
    fn test_edit_rejects_bad_input() {
        let svc = pantry_with_soy_sauce();
        assert!(cmd_edit(&svc, SOY_SAUCE, Some("  "), &[], None, None, true).is_err());
        assert!(cmd_edit(&svc, SOY_SAUCE, None, &[], Some("someday"), None, true).is_err());
        assert_eq!(stored(&svc).name, "condiment");
    }

    #[test]
    fn test_add_allocates_local_id() {
        let svc = PantryService::new_in_memory().unwrap();
        let aliases = vec!["leftovers".to_string()];
        cmd_add(&svc, " Curry ", "tomorrow", 2, &aliases, true).unwrap();

        let all = svc.ingredient_get_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, -1);
        assert_eq!(all[0].name, "Curry");
        assert_eq!(all[0].quantity, "2");
        assert_eq!(all[0].possible_names, vec!["Curry", "leftovers"]);
        assert!(cmd_add(&svc, "", "tomorrow", 1, &[], true).is_err());
    }

    #[test]
    fn test_clear() {
        let svc = pantry_with_soy_sauce();
        cmd_clear(&svc, false, true).unwrap();
        assert!(svc.ingredient_get_all().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_scan_stores_product_with_overrides() {
        let server = product_server(json!(["en:condiments", "en:sauces", "en:soy-sauces"])).await;
        let off = OpenFoodFactsClient::new(&server.uri()).unwrap();
        let svc = PantryService::new_in_memory().unwrap();

        cmd_scan(
            &svc,
            &off,
            " 8715035110106 ",
            Some("Kikkoman"),
            Some("2030-01-02"),
            Some(2),
            true,
        )
        .await
        .unwrap();

        let ing = stored(&svc);
        assert_eq!(ing.name, "Kikkoman");
        assert_eq!(
            ing.possible_names,
            vec!["condiment", "sauce", "soy sauce", "Kikkoman"]
        );
        assert_eq!(ing.quantity, "2");
        assert_eq!(ing.expiration_date, date(2030, 1, 2));
    }

    #[tokio::test]
    async fn test_scan_uses_product_defaults() {
        let server = product_server(json!(["en:soy-sauces"])).await;
        let off = OpenFoodFactsClient::new(&server.uri()).unwrap();
        let svc = PantryService::new_in_memory().unwrap();

        cmd_scan(&svc, &off, "8715035110106", None, None, None, true)
            .await
            .unwrap();

        let ing = stored(&svc);
        assert_eq!(ing.name, "soy sauce");
        assert_eq!(ing.quantity, "150");
        assert_eq!(ing.expiration_date, date(2030, 5, 1));

        // A second scan of the same barcode is refused
        assert!(
            cmd_scan(&svc, &off, "8715035110106", None, None, None, true)
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_scan_without_category_needs_name() {
        let server = product_server(json!([])).await;
        let off = OpenFoodFactsClient::new(&server.uri()).unwrap();
        let svc = PantryService::new_in_memory().unwrap();

        let err = cmd_scan(&svc, &off, "8715035110106", None, None, None, true)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("--name"));
        assert!(svc.ingredient_get_all().unwrap().is_empty());

        cmd_scan(&svc, &off, "8715035110106", Some("Mystery jar"), None, None, true)
            .await
            .unwrap();
        assert_eq!(stored(&svc).possible_names, vec!["Mystery jar"]);
    }
}
