//! List parameters and the SELECT plans built from them.
//!
//! The engine defaults rather than rejects: unknown sort keys become `name`,
//! unknown orders become `asc`, and limits are clamped. Strict rejection is
//! the request surface's job and goes through the `FromStr` impls.

use std::{fmt, str::FromStr};

use models::{service, service_version};
use sea_orm::sea_query::{BinOper, Expr, Func, SimpleExpr};
use sea_orm::{ColumnTrait, EntityTrait, Order, QueryFilter, QueryOrder, QuerySelect, Select};
use uuid::Uuid;

use crate::pagination::Pagination;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Name,
    CreatedAt,
    UpdatedAt,
}

impl SortKey {
    pub const ALLOWED: [&'static str; 3] = ["name", "created_at", "updated_at"];

    /// Permissive parse: anything unrecognised falls back to `Name`.
    pub fn lenient(raw: &str) -> Self {
        raw.parse().unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Name => "name",
            SortKey::CreatedAt => "created_at",
            SortKey::UpdatedAt => "updated_at",
        }
    }

    fn column(&self) -> service::Column {
        match self {
            SortKey::Name => service::Column::Name,
            SortKey::CreatedAt => service::Column::CreatedAt,
            SortKey::UpdatedAt => service::Column::UpdatedAt,
        }
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(SortKey::Name),
            "created_at" => Ok(SortKey::CreatedAt),
            "updated_at" => Ok(SortKey::UpdatedAt),
            _ => Err(format!("must be one of: {}", Self::ALLOWED.join(", "))),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Permissive, case-insensitive parse: anything but `desc` is `Asc`.
    pub fn lenient(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("desc") { SortOrder::Desc } else { SortOrder::Asc }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }

    fn as_order(&self) -> Order {
        match self {
            SortOrder::Asc => Order::Asc,
            SortOrder::Desc => Order::Desc,
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    /// Strict parse used at the request boundary: exactly `asc` or `desc`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err("must be either 'asc' or 'desc'".to_string()),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Raw listing parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListServicesParams {
    pub search: String,
    pub sort: SortKey,
    pub order: SortOrder,
    pub page: Pagination,
    pub include_versions: bool,
}

impl ListServicesParams {
    pub fn new() -> Self { Self::default() }

    pub fn search(mut self, q: impl Into<String>) -> Self { self.search = q.into(); self }

    /// Set the sort key from an unchecked string (falls back to `name`).
    pub fn sort_key(mut self, raw: &str) -> Self { self.sort = SortKey::lenient(raw); self }

    /// Set the order from an unchecked string (falls back to `asc`).
    pub fn sort_order(mut self, raw: &str) -> Self { self.order = SortOrder::lenient(raw); self }

    pub fn sort(mut self, key: SortKey, order: SortOrder) -> Self { self.sort = key; self.order = order; self }

    pub fn limit(mut self, limit: i64) -> Self { self.page.limit = limit; self }

    pub fn offset(mut self, offset: u64) -> Self { self.page.offset = offset; self }

    pub fn include_versions(mut self, yes: bool) -> Self { self.include_versions = yes; self }

    /// Resolve fallbacks and clamping into the parameters actually executed.
    pub fn normalize(&self, max_page_size: u64) -> EffectiveListParams {
        let (limit, offset) = self.page.normalize(max_page_size);
        EffectiveListParams {
            prefix: (!self.search.is_empty()).then(|| self.search.clone()),
            sort: self.sort,
            order: self.order,
            limit,
            offset,
            include_versions: self.include_versions,
        }
    }
}

/// Parameters after fallback and clamping. Results are a deterministic
/// function of these and the stored rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveListParams {
    /// search prefix as given; the store case-folds both sides. `None` means no filter
    pub prefix: Option<String>,
    pub sort: SortKey,
    pub order: SortOrder,
    pub limit: u64,
    pub offset: u64,
    pub include_versions: bool,
}

/// Escape LIKE metacharacters so the text matches literally.
pub fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Parent page query: prefix filter, resolved sort with id tie-break in the
/// same direction, then limit/offset. The search text is always bound, and
/// both the column and the pattern go through the store's `LOWER`.
pub fn list_services_query(p: &EffectiveListParams) -> Select<service::Entity> {
    let mut select = service::Entity::find();
    if let Some(prefix) = &p.prefix {
        let pattern = SimpleExpr::Binary(
            Box::new(Func::lower(Expr::val(format!("{}%", escape_like(prefix)))).into()),
            BinOper::Escape,
            Box::new(SimpleExpr::Constant('\\'.into())),
        );
        select = select.filter(
            Expr::expr(Func::lower(Expr::col((service::Entity, service::Column::Name))))
                .binary(BinOper::Like, pattern),
        );
    }
    let order = p.order.as_order();
    select
        .order_by(p.sort.column(), order.clone())
        .order_by(service::Column::Id, order)
        .limit(p.limit)
        .offset(p.offset)
}

/// Child query for a whole page of parents, grouped by parent and newest first.
pub fn versions_for_services_query(service_ids: Vec<Uuid>) -> Select<service_version::Entity> {
    service_version::Entity::find()
        .filter(service_version::Column::ServiceId.is_in(service_ids))
        .order_by_asc(service_version::Column::ServiceId)
        .order_by_desc(service_version::Column::CreatedAt)
        .order_by_desc(service_version::Column::Id)
}

/// Versions of a single service, newest first.
pub fn versions_of_service_query(service_id: Uuid) -> Select<service_version::Entity> {
    service_version::Entity::find()
        .filter(service_version::Column::ServiceId.eq(service_id))
        .order_by_desc(service_version::Column::CreatedAt)
        .order_by_desc(service_version::Column::Id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DbBackend, QueryTrait};

    fn sql(p: &EffectiveListParams) -> String {
        list_services_query(p).build(DbBackend::Postgres).to_string()
    }

    #[test]
    fn unknown_sort_key_falls_back_to_name() {
        assert_eq!(SortKey::lenient("bogus"), SortKey::Name);
        assert_eq!(SortKey::lenient(""), SortKey::Name);
        assert_eq!(SortKey::lenient("created_at"), SortKey::CreatedAt);
        let bogus = ListServicesParams::new().sort_key("bogus").normalize(100);
        let name = ListServicesParams::new().sort_key("name").normalize(100);
        assert_eq!(bogus, name);
        assert_eq!(sql(&bogus), sql(&name));
    }

    #[test]
    fn sort_order_is_case_insensitive_and_defaults_to_asc() {
        assert_eq!(SortOrder::lenient("DESC"), SortOrder::Desc);
        assert_eq!(SortOrder::lenient("desc"), SortOrder::Desc);
        assert_eq!(SortOrder::lenient("sideways"), SortOrder::Asc);
        assert_eq!(SortOrder::lenient(""), SortOrder::Asc);
    }

    #[test]
    fn strict_parsers_reject_unknown_values() {
        assert!("bogus".parse::<SortKey>().is_err());
        assert!("DESC".parse::<SortOrder>().is_err());
        assert_eq!("updated_at".parse::<SortKey>(), Ok(SortKey::UpdatedAt));
    }

    #[test]
    fn normalize_clamps_limit_and_keeps_prefix_verbatim() {
        let p = ListServicesParams::new().search("AUTH").limit(100_000).offset(7).normalize(100);
        assert_eq!(p.limit, 100);
        assert_eq!(p.offset, 7);
        assert_eq!(p.prefix.as_deref(), Some("AUTH"));

        let p = ListServicesParams::new().normalize(100);
        assert_eq!(p.prefix, None);
        assert_eq!(p.limit, 100);
    }

    #[test]
    fn escape_like_neutralises_wildcards() {
        assert_eq!(escape_like("api"), "api");
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
    }

    #[test]
    fn list_query_orders_by_column_then_id_in_same_direction() {
        let p = ListServicesParams::new().sort(SortKey::CreatedAt, SortOrder::Desc).limit(10).normalize(100);
        let s = sql(&p);
        assert!(s.contains(r#"ORDER BY "services"."created_at" DESC, "services"."id" DESC"#), "{s}");
        assert!(s.contains("LIMIT 10"), "{s}");
        assert!(!s.contains("WHERE"), "{s}");
    }

    #[test]
    fn list_query_folds_column_and_pattern_in_the_store() {
        let p = ListServicesParams::new().search("Api").normalize(100);
        let s = sql(&p);
        assert!(s.contains(r#"LOWER("services"."name") LIKE LOWER('Api%') ESCAPE"#), "{s}");
        assert!(s.contains(r#"ORDER BY "services"."name" ASC, "services"."id" ASC"#), "{s}");
    }

    #[test]
    fn search_text_is_bound_not_spliced() {
        let p = ListServicesParams::new().search("x'; DROP TABLE services; --").normalize(100);
        let stmt = list_services_query(&p).build(DbBackend::Postgres);
        assert!(!stmt.sql.contains("DROP TABLE"), "{}", stmt.sql);
        assert!(stmt.values.is_some());
    }

    #[test]
    fn huge_offset_is_capped_in_the_query() {
        let p = ListServicesParams::new().offset(u64::MAX).normalize(100);
        let s = sql(&p);
        assert!(s.contains(&format!("OFFSET {}", i64::MAX)), "{s}");
    }

    #[test]
    fn batched_versions_query_groups_by_parent_newest_first() {
        let s = versions_for_services_query(vec![Uuid::new_v4(), Uuid::new_v4()])
            .build(DbBackend::Postgres)
            .to_string();
        assert!(s.contains(r#""service_versions"."service_id" IN ("#), "{s}");
        assert!(
            s.contains(r#"ORDER BY "service_versions"."service_id" ASC, "service_versions"."created_at" DESC, "service_versions"."id" DESC"#),
            "{s}"
        );
    }
}
