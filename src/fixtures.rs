//! Canned answers and source sets, keyed on keywords in the question. Used
//! by the UI when no chat endpoint is configured so the app runs without
//! any provider. Keyword categories are checked in a fixed order and the
//! first match wins.

use crate::api::{ChatResponse, Source, SourceMetadata};

fn source(id: i64, content: &str, page: u32, origin: &str, similarity: f32) -> Source {
    Source {
        id,
        content: content.to_string(),
        metadata: SourceMetadata {
            page: Some(page),
            origin: Some(origin.to_string()),
        },
        similarity,
    }
}

fn breastfeeding_sources() -> Vec<Source> {
    vec![
        source(
            1,
            "Breastfeeding provides optimal nutrition for infants during their first six months of life. The American Academy of Pediatrics recommends exclusive breastfeeding for the first 6 months, followed by continued breastfeeding along with appropriate complementary foods for 1 year or longer.",
            15,
            "human-nutrition-text.pdf",
            0.89,
        ),
        source(
            2,
            "Breast milk contains the perfect combination of proteins, fats, vitamins, and carbohydrates that are easily digestible for babies. It also provides antibodies that help protect infants from infections and diseases.",
            16,
            "human-nutrition-text.pdf",
            0.84,
        ),
        source(
            3,
            "Infants should be fed every 2-3 hours, or 8-12 times per day during the newborn period. As babies grow, feeding frequency typically decreases but individual needs may vary.",
            17,
            "human-nutrition-text.pdf",
            0.79,
        ),
    ]
}

fn vitamin_sources() -> Vec<Source> {
    vec![
        source(
            4,
            "Water-soluble vitamins include vitamin C and the B-complex vitamins (thiamine, riboflavin, niacin, pantothenic acid, pyridoxine, biotin, folate, and cobalamin). These vitamins are not stored in significant amounts and must be consumed regularly.",
            42,
            "micronutrients-guide.pdf",
            0.92,
        ),
        source(
            5,
            "Fat-soluble vitamins A, D, E, and K are stored in fatty tissues and the liver. Vitamin D can be synthesized in the skin upon exposure to ultraviolet radiation from sunlight.",
            45,
            "micronutrients-guide.pdf",
            0.87,
        ),
        source(
            6,
            "Deficiency symptoms vary by vitamin: scurvy for vitamin C, beriberi for thiamine, pellagra for niacin, and rickets for vitamin D in children.",
            48,
            "deficiency-disorders.pdf",
            0.81,
        ),
    ]
}

fn mineral_sources() -> Vec<Source> {
    vec![
        source(
            7,
            "Calcium is the most abundant mineral in the human body, with 99% stored in bones and teeth. Daily calcium requirements vary by age, with higher needs during growth periods and for postmenopausal women.",
            67,
            "mineral-metabolism.pdf",
            0.88,
        ),
        source(
            8,
            "Iron deficiency is the most common nutritional deficiency worldwide. Iron exists in two forms in food: heme iron from animal sources and non-heme iron from plant sources.",
            71,
            "mineral-metabolism.pdf",
            0.85,
        ),
        source(
            9,
            "Zinc plays crucial roles in immune function, wound healing, and protein synthesis. Good sources include meat, seafood, nuts, and whole grains.",
            74,
            "trace-elements.pdf",
            0.82,
        ),
    ]
}

fn protein_sources() -> Vec<Source> {
    vec![
        source(
            10,
            "Complete proteins contain all nine essential amino acids in adequate proportions. Animal proteins are typically complete, while most plant proteins are incomplete.",
            28,
            "macronutrients-basics.pdf",
            0.91,
        ),
        source(
            11,
            "Protein requirements are based on body weight, with the RDA being 0.8 grams per kilogram of body weight for healthy adults. Athletes and older adults may need more.",
            31,
            "protein-requirements.pdf",
            0.86,
        ),
        source(
            12,
            "Protein quality is determined by amino acid composition and digestibility. The Protein Digestibility Corrected Amino Acid Score (PDCAAS) is commonly used to assess protein quality.",
            35,
            "protein-quality-assessment.pdf",
            0.83,
        ),
    ]
}

fn carbohydrate_sources() -> Vec<Source> {
    vec![
        source(
            13,
            "Carbohydrates are the body's preferred source of energy. They include simple sugars, complex starches, and dietary fiber, each serving different physiological functions.",
            52,
            "carbohydrate-metabolism.pdf",
            0.90,
        ),
        source(
            14,
            "The glycemic index measures how quickly carbohydrate-containing foods raise blood glucose levels. Low-GI foods provide more sustained energy release.",
            55,
            "glycemic-response.pdf",
            0.87,
        ),
        source(
            15,
            "Dietary fiber is beneficial for digestive health, blood sugar control, and cholesterol management. The recommended intake is 25-35 grams per day for adults.",
            58,
            "fiber-health-benefits.pdf",
            0.84,
        ),
    ]
}

fn general_sources() -> Vec<Source> {
    vec![
        source(
            16,
            "A balanced diet includes appropriate portions from all food groups: fruits, vegetables, grains, protein foods, and dairy or dairy alternatives.",
            12,
            "dietary-guidelines.pdf",
            0.78,
        ),
        source(
            17,
            "Nutritional needs vary throughout the lifecycle, with specific considerations for pregnancy, lactation, childhood, adolescence, and older adults.",
            89,
            "lifecycle-nutrition.pdf",
            0.76,
        ),
        source(
            18,
            "Food safety practices are essential to prevent foodborne illness. This includes proper storage, handling, and preparation of foods.",
            102,
            "food-safety-handbook.pdf",
            0.73,
        ),
    ]
}

/// Build a canned response for the given question. Categories are checked
/// first-match in a fixed order: breastfeeding, vitamins, minerals,
/// protein, carbohydrates, then a general fallback.
pub fn canned_response(message: &str) -> ChatResponse {
    let m = message.to_lowercase();

    let (answer, sources) = if m.contains("breastfeed") || m.contains("infant") || m.contains("baby")
    {
        (
            "Based on the nutritional guidelines, infants should be breastfed frequently during their early months. [1] The American Academy of Pediatrics recommends exclusive breastfeeding for the first 6 months of life. [2] Breast milk provides optimal nutrition with the perfect combination of proteins, fats, vitamins, and carbohydrates, plus important antibodies for immune protection. [3] Newborns typically need to be fed every 2-3 hours, which equals about 8-12 times per day, though individual needs may vary as babies grow.".to_string(),
            breastfeeding_sources(),
        )
    } else if m.contains("vitamin") {
        (
            "Vitamins are essential micronutrients that support various bodily functions. [1] Water-soluble vitamins like vitamin C and B-complex vitamins need regular replenishment as they're not stored in the body. [2] Fat-soluble vitamins (A, D, E, K) are stored in fatty tissues and the liver, with vitamin D uniquely synthesized through sun exposure. [3] Deficiency symptoms are specific to each vitamin and can lead to serious health conditions if left untreated.".to_string(),
            vitamin_sources(),
        )
    } else if m.contains("mineral")
        || m.contains("calcium")
        || m.contains("iron")
        || m.contains("zinc")
    {
        (
            "Minerals are inorganic substances essential for various bodily functions. [1] Calcium is the most abundant mineral, primarily stored in bones and teeth, with requirements varying by life stage. [2] Iron deficiency is the most common nutritional deficiency globally, with absorption differing between heme and non-heme sources. [3] Zinc supports immune function, wound healing, and protein synthesis, found in meat, seafood, and plant sources.".to_string(),
            mineral_sources(),
        )
    } else if m.contains("protein") || m.contains("amino") {
        (
            "Proteins are macronutrients composed of amino acids essential for growth and maintenance. [1] Complete proteins contain all nine essential amino acids, typically found in animal sources, while plant proteins are often incomplete. [2] Protein requirements are individualized based on body weight, with the RDA being 0.8g per kg for healthy adults. [3] Protein quality is assessed using methods like PDCAAS, which considers amino acid composition and digestibility.".to_string(),
            protein_sources(),
        )
    } else if m.contains("carbohydrate")
        || m.contains("sugar")
        || m.contains("fiber")
        || m.contains("glucose")
    {
        (
            "Carbohydrates serve as the body's primary energy source and include various forms with different functions. [1] They encompass simple sugars, complex starches, and dietary fiber, each serving unique physiological roles. [2] The glycemic index helps predict blood sugar response, with low-GI foods providing more sustained energy release. [3] Dietary fiber offers multiple health benefits including improved digestion, blood sugar control, and cholesterol management.".to_string(),
            carbohydrate_sources(),
        )
    } else {
        (
            format!(
                "Thank you for your question about \"{}\". [1] Based on current nutritional science, a balanced diet should include appropriate portions from all major food groups. [2] Nutritional needs change throughout different life stages, requiring adjustments for optimal health. [3] Food safety practices are also crucial for preventing illness and maintaining nutritional quality.",
                message
            ),
            general_sources(),
        )
    };

    ChatResponse { answer, sources }
}
