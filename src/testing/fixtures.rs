//! Fixture helpers shared by unit and integration tests

use chrono::Utc;

use crate::collection::{Collection, GeneratorRef, TraitCategory, TraitOption, TraitTemplate};
use crate::generation::{
    DeliveryStrategy, GenerationRecord, GenerationStatus, ReviewOutcome,
};
use crate::owner::OwnerRef;

/// A completed, unreviewed record for `col`/`user` under the given id
pub fn completed_record(id: &str, collection_id: &str, user_id: &str) -> GenerationRecord {
    GenerationRecord {
        id: id.to_string(),
        collection_id: collection_id.to_string(),
        owner: OwnerRef::user(user_id),
        status: GenerationStatus::Completed,
        review: None,
        delivery: DeliveryStrategy::Final,
        cost: 1,
        created_at: Utc::now(),
    }
}

/// A completed record carrying an explicit review outcome
pub fn reviewed_record(
    id: &str,
    collection_id: &str,
    user_id: &str,
    review: ReviewOutcome,
) -> GenerationRecord {
    let mut record = completed_record(id, collection_id, user_id);
    record.review = Some(review);
    record
}

/// A two-category template with uniform weights
pub fn simple_template() -> TraitTemplate {
    TraitTemplate::new(vec![
        TraitCategory::new(
            "background",
            vec![TraitOption::new("emerald"), TraitOption::new("onyx")],
        ),
        TraitCategory::new(
            "frame",
            vec![TraitOption::new("gold"), TraitOption::new("silver")],
        ),
    ])
}

/// A tool-backed collection definition
pub fn tool_collection(collection_id: &str, user_id: &str, target_supply: u64) -> Collection {
    Collection {
        id: collection_id.to_string(),
        owner: OwnerRef::user(user_id),
        generator: GeneratorRef::Tool("tool-1".to_string()),
        target_supply,
        traits: simple_template(),
        params: Default::default(),
    }
}
