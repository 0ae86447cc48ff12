//! The built-in insurance and solar quote graph.
//!
//! Four product branches fan out from `start` and funnel back through the
//! shared contact step into `results`. Branch-specific steps reuse semantic
//! answer keys ("coverage-level", "coverage-amount") so the quote
//! calculator reads one vocabulary regardless of the path taken.

use crate::error::GraphError;
use crate::graph::{GraphBuilder, Question, QuestionGraph, QuestionKind, RESULTS_STEP, START_STEP};

/// Build the standard quote wizard graph.
pub fn insurance_graph() -> Result<QuestionGraph, GraphError> {
    GraphBuilder::new()
        .step(
            Question::builder(START_STEP, QuestionKind::SingleSelect)
                .key("insurance-type")
                .prompt("What would you like a quote for?")
                .description("Pick a product to get started. It only takes a couple of minutes.")
                .option("life", "Life insurance")
                .option("auto", "Auto insurance")
                .option("home", "Home insurance")
                .option("solar", "Solar panels")
                .branch("life", "life-coverage-level")
                .branch("auto", "auto-vehicle-use")
                .branch("home", "home-property-type")
                .branch("solar", "solar-roof-direction")
                .build(),
        )
        // ── Life ────────────────────────────────────────────────────────
        .step(
            Question::builder("life-coverage-level", QuestionKind::SingleSelect)
                .key("coverage-level")
                .prompt("How much protection do you want?")
                .option("basic", "Basic")
                .option("standard", "Standard")
                .option("comprehensive", "Comprehensive")
                .next("coverage-amount")
                .build(),
        )
        .step(
            Question::builder("coverage-amount", QuestionKind::Slider)
                .prompt("How much coverage do you need?")
                .slider(50_000.0, 2_000_000.0, 50_000.0, 500_000.0)
                .next("life-age-band")
                .build(),
        )
        .step(
            Question::builder("life-age-band", QuestionKind::SingleSelect)
                .key("age-band")
                .prompt("How old are you?")
                .option("18-24", "18–24")
                .option("25-34", "25–34")
                .option("35-44", "35–44")
                .option("45-54", "45–54")
                .option("55-64", "55–64")
                .option("65+", "65 and over")
                .next("life-smoker")
                .build(),
        )
        .step(
            Question::builder("life-smoker", QuestionKind::SingleSelect)
                .key("smoker")
                .prompt("Do you smoke?")
                .option("no", "No")
                .option("yes", "Yes")
                .next("contact-details")
                .build(),
        )
        // ── Auto ────────────────────────────────────────────────────────
        .step(
            Question::builder("auto-vehicle-use", QuestionKind::SingleSelect)
                .key("vehicle-use")
                .prompt("How do you use your vehicle?")
                .option("personal", "Personal")
                .option("commercial", "Commercial")
                .option("rideshare", "Rideshare")
                .next("auto-coverage-level")
                .build(),
        )
        .step(
            Question::builder("auto-coverage-level", QuestionKind::SingleSelect)
                .key("coverage-level")
                .prompt("What level of cover?")
                .option("basic", "Third party")
                .option("standard", "Third party, fire and theft")
                .option("comprehensive", "Comprehensive")
                .next("auto-coverage-amount")
                .build(),
        )
        .step(
            Question::builder("auto-coverage-amount", QuestionKind::Slider)
                .key("coverage-amount")
                .prompt("Roughly what is your vehicle worth?")
                .slider(5_000.0, 150_000.0, 1_000.0, 20_000.0)
                .next("contact-details")
                .build(),
        )
        // ── Home ────────────────────────────────────────────────────────
        .step(
            Question::builder("home-property-type", QuestionKind::SingleSelect)
                .key("property-type")
                .prompt("What kind of property is it?")
                .option("house", "Detached house")
                .option("townhouse", "Townhouse")
                .option("apartment", "Apartment")
                .next("home-location")
                .build(),
        )
        .step(
            Question::builder("home-location", QuestionKind::LocationSelect)
                .key("location")
                .prompt("Where is the property?")
                .description("Town or suburb. We use this to estimate local risk.")
                .next("home-coverage-amount")
                .build(),
        )
        .step(
            Question::builder("home-coverage-amount", QuestionKind::Slider)
                .key("coverage-amount")
                .prompt("What is the rebuild value?")
                .slider(100_000.0, 1_500_000.0, 25_000.0, 250_000.0)
                .next("contact-details")
                .build(),
        )
        // ── Solar ───────────────────────────────────────────────────────
        .step(
            Question::builder("solar-roof-direction", QuestionKind::SingleSelect)
                .key("roof-direction")
                .prompt("Which way does your roof face?")
                .option("north", "North")
                .option("south", "South")
                .option("east", "East")
                .option("west", "West")
                .next("solar-extras")
                .build(),
        )
        .step(
            Question::builder("solar-extras", QuestionKind::MultiSelect)
                .key("extras")
                .prompt("Any extras?")
                .option("battery", "Battery storage")
                .option("ev-charger", "EV charger")
                .option("heat-pump", "Heat pump")
                .next("solar-plan")
                .build(),
        )
        .step(
            Question::builder("solar-plan", QuestionKind::AiRecommendation)
                .key("recommended-plan")
                .prompt("Our recommendation for your setup")
                .description("Based on your roof and extras. You can pick a different plan.")
                .option("eco", "Eco — 8 panels")
                .option("plus", "Plus — 12 panels")
                .option("max", "Max — 18 panels with battery-ready inverter")
                .next("contact-details")
                .build(),
        )
        // ── Shared tail ─────────────────────────────────────────────────
        .step(
            Question::builder("contact-details", QuestionKind::ContactFields)
                .prompt("Where should we send your quote?")
                .field("name")
                .field("email")
                .field("phone")
                .field("postcode")
                .next(RESULTS_STEP)
                .build(),
        )
        .step(
            Question::builder(RESULTS_STEP, QuestionKind::Terminal)
                .prompt("Your estimated premium")
                .build(),
        )
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wizard::form::AnswerValue;
    use crate::wizard::navigator::StepNavigator;

    #[test]
    fn catalog_graph_validates() {
        let graph = insurance_graph().unwrap();
        assert!(graph.contains(START_STEP));
        assert!(graph.contains(RESULTS_STEP));
        assert_eq!(graph.len(), 16);
    }

    #[test]
    fn every_product_branch_reaches_results() {
        let graph = insurance_graph().unwrap();
        let nav = StepNavigator::new(&graph);

        for product in ["life", "auto", "home", "solar"] {
            let mut current = nav
                .resolve(START_STEP, &AnswerValue::from(product))
                .unwrap();
            let mut hops = 0;
            while current != RESULTS_STEP {
                let step = graph.get(&current).unwrap();
                // Walk the first available edge.
                let next = step
                    .next_step_id
                    .clone()
                    .or_else(|| step.successors().first().map(|s| s.to_string()))
                    .unwrap_or_else(|| panic!("dead end at {current} on {product} branch"));
                current = next;
                hops += 1;
                assert!(hops < 32, "runaway walk on {product} branch");
            }
        }
    }

    #[test]
    fn branch_steps_share_semantic_keys() {
        let graph = insurance_graph().unwrap();
        assert_eq!(graph.get("life-coverage-level").unwrap().answer_key(), "coverage-level");
        assert_eq!(graph.get("auto-coverage-level").unwrap().answer_key(), "coverage-level");
        assert_eq!(graph.get("auto-coverage-amount").unwrap().answer_key(), "coverage-amount");
        // Defaults to the step id when unset.
        assert_eq!(graph.get("coverage-amount").unwrap().answer_key(), "coverage-amount");
        assert_eq!(graph.get("contact-details").unwrap().answer_key(), "contact-details");
    }
}
