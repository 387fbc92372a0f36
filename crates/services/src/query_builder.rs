//! # Item Query Builder
//!
//! Pure functions from filter state (or a fixed surface) to a
//! [`QueryDescription`]. Predicates are emitted in a fixed precedence:
//! status, brand, price floor, price ceiling, recommendation.

use domains::{FilterState, ItemStatus, Predicate, QueryDescription, SortDirective, SortOrder};
use uuid::Uuid;

/// Builds the feed query for a decoded filter state. The feed has no limit.
pub fn build(state: &FilterState) -> QueryDescription {
    let sort = match state.sort {
        SortOrder::PriceAsc => SortDirective::PriceAscending,
        SortOrder::PriceDesc => SortDirective::PriceDescending,
        SortOrder::Newest => SortDirective::Newest,
    };
    let mut query = QueryDescription::new(sort).with(Predicate::StatusEq(ItemStatus::Active));

    if !state.brands.is_empty() {
        query = query.with(Predicate::BrandIn(state.brands.clone()));
    }
    if let Some(min) = state.min_price {
        query = query.with(Predicate::PriceAtLeast(f64::from(min)));
    }
    // A zero ceiling means "unbounded", not "exclude everything".
    if let Some(max) = state.max_price.filter(|max| *max > 0) {
        query = query.with(Predicate::PriceAtMost(f64::from(max)));
    }
    if !state.ai.is_empty() {
        query = query.with(Predicate::RecommendationIn(state.ai.clone()));
    }

    query
}

/// Homepage/navbar list: newest active items, fixed cap.
pub fn trending(limit: usize) -> QueryDescription {
    QueryDescription::new(SortDirective::Newest)
        .with(Predicate::StatusEq(ItemStatus::Active))
        .limit(limit)
}

/// Featured grid: active items grouped by recommendation, fixed cap.
pub fn featured(limit: usize) -> QueryDescription {
    QueryDescription::new(SortDirective::RecommendationThenNewest)
        .with(Predicate::StatusEq(ItemStatus::Active))
        .limit(limit)
}

/// Search-as-you-type. Returns `None` for a blank term so callers can skip the store.
pub fn search(term: &str, limit: usize) -> Option<QueryDescription> {
    let term = term.trim();
    if term.is_empty() {
        return None;
    }
    Some(
        QueryDescription::new(SortDirective::Newest)
            .with(Predicate::StatusEq(ItemStatus::Active))
            .with(Predicate::TitleOrBrandContains(term.to_string()))
            .limit(limit),
    )
}

/// Every item a seller owns, any status, newest first.
pub fn seller_items(seller_id: Uuid) -> QueryDescription {
    QueryDescription::new(SortDirective::Newest).with(Predicate::SellerEq(seller_id))
}

/// A seller's items in one status, with the given ordering.
pub fn seller_items_with_status(seller_id: Uuid, status: ItemStatus, sort: SortDirective) -> QueryDescription {
    QueryDescription::new(sort)
        .with(Predicate::SellerEq(seller_id))
        .with(Predicate::StatusEq(status))
}

#[cfg(test)]
mod tests {
    use super::*;
    use domains::AiRecommendation;

    #[test]
    fn default_state_only_restricts_status() {
        let q = build(&FilterState::default());
        assert_eq!(q.predicates, vec![Predicate::StatusEq(ItemStatus::Active)]);
        assert_eq!(q.sort, SortDirective::Newest);
        assert_eq!(q.limit, None);
    }

    #[test]
    fn predicates_follow_precedence() {
        let state = FilterState {
            brands: vec!["Nike".into()],
            min_price: Some(100),
            max_price: Some(500),
            ai: vec![AiRecommendation::Hold],
            sort: SortOrder::PriceDesc,
        };
        let q = build(&state);
        assert_eq!(
            q.predicates,
            vec![
                Predicate::StatusEq(ItemStatus::Active),
                Predicate::BrandIn(vec!["Nike".into()]),
                Predicate::PriceAtLeast(100.0),
                Predicate::PriceAtMost(500.0),
                Predicate::RecommendationIn(vec![AiRecommendation::Hold]),
            ]
        );
        assert_eq!(q.sort, SortDirective::PriceDescending);
    }

    #[test]
    fn zero_ceiling_is_unbounded() {
        let state = FilterState { max_price: Some(0), ..Default::default() };
        let q = build(&state);
        assert!(!q.predicates.iter().any(|p| matches!(p, Predicate::PriceAtMost(_))));
    }

    #[test]
    fn blank_search_skips_the_store() {
        assert!(search("   ", 10).is_none());
        let q = search("  dunk ", 10).unwrap();
        assert!(q.predicates.contains(&Predicate::TitleOrBrandContains("dunk".into())));
        assert_eq!(q.limit, Some(10));
    }

    #[test]
    fn surface_variants_are_capped() {
        assert_eq!(trending(5).limit, Some(5));
        assert_eq!(featured(6).sort, SortDirective::RecommendationThenNewest);
    }

    #[test]
    fn seller_status_query_keeps_requested_sort() {
        let seller = Uuid::new_v4();
        let q = seller_items_with_status(seller, ItemStatus::Active, SortDirective::PriceDescending);
        assert_eq!(q.sort, SortDirective::PriceDescending);
        assert_eq!(
            q.predicates,
            vec![Predicate::SellerEq(seller), Predicate::StatusEq(ItemStatus::Active)]
        );
    }
}
