use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashSet;
use thiserror::Error;
use utoipa::IntoParams;
use validator::Validate;

use crate::models::{Order, OrderStatus};

/// Filter values meaning "do not restrict by this field".
const ALL_SENTINELS: [&str; 2] = ["todos", "all"];

/// Query-string format produced by the dashboard date pickers.
const QUERY_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Error, PartialEq)]
pub enum FilterError {
    #[error("invalid {field}: {value} (expected YYYY-MM-DD)")]
    InvalidDate { field: &'static str, value: String },
    #[error("invalid status: {0}")]
    InvalidStatus(String),
}

/// Conjunction of optional predicates. `None` lets every order through.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportFilters {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<OrderStatus>,
    pub customer: Option<String>,
    pub product_type: Option<String>,
}

impl ReportFilters {
    pub fn has_date_bounds(&self) -> bool {
        self.start_date.is_some() || self.end_date.is_some()
    }

    pub fn matches(&self, order: &Order) -> bool {
        self.matches_date(order)
            && self.matches_status(order)
            && self.matches_customer(order)
            && self.matches_product(order)
    }

    fn matches_date(&self, order: &Order) -> bool {
        if !self.has_date_bounds() {
            return true;
        }

        let Some(date) = order.order_date() else {
            tracing::warn!(order_id = %order.id, date = %order.date, "order date is not d/m/yyyy, excluded from date range");
            return false;
        };

        self.start_date.map_or(true, |start| start <= date)
            && self.end_date.map_or(true, |end| date <= end)
    }

    fn matches_status(&self, order: &Order) -> bool {
        self.status.map_or(true, |status| order.status == status)
    }

    fn matches_customer(&self, order: &Order) -> bool {
        self.customer
            .as_deref()
            .map_or(true, |customer| order.user_name == customer || order.user_email == customer)
    }

    fn matches_product(&self, order: &Order) -> bool {
        let Some(needle) = self.product_type.as_deref() else {
            return true;
        };
        let needle = needle.to_lowercase();
        order
            .items
            .iter()
            .any(|item| item.name.to_lowercase().contains(&needle))
    }
}

/// A report request: either a direct order-number lookup or a filter set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportRequest {
    pub order_id: Option<String>,
    pub filters: ReportFilters,
}

/// Report query string as sent by the dashboard.
#[derive(Debug, Clone, Default, Deserialize, Validate, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ReportQuery {
    /// Inclusive lower bound, `YYYY-MM-DD`
    pub start_date: Option<String>,
    /// Inclusive upper bound, `YYYY-MM-DD`
    pub end_date: Option<String>,
    /// Order status label or `Todos`
    pub status: Option<String>,
    /// Customer name or email, or `Todos`
    pub customer: Option<String>,
    /// Case-insensitive substring of an item name
    #[validate(length(max = 100, message = "product filter is too long"))]
    pub product_type: Option<String>,
    /// Exact order number; overrides every other filter
    #[validate(length(max = 64, message = "order number is too long"))]
    pub order_id: Option<String>,
}

impl ReportQuery {
    pub fn into_request(self) -> Result<ReportRequest, FilterError> {
        let status = selection(self.status)
            .map(|value| {
                value
                    .parse::<OrderStatus>()
                    .map_err(|_| FilterError::InvalidStatus(value))
            })
            .transpose()?;

        Ok(ReportRequest {
            order_id: non_empty(self.order_id),
            filters: ReportFilters {
                start_date: parse_query_date("startDate", self.start_date)?,
                end_date: parse_query_date("endDate", self.end_date)?,
                status,
                customer: selection(self.customer),
                product_type: selection(self.product_type),
            },
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn selection(value: Option<String>) -> Option<String> {
    non_empty(value).filter(|value| {
        !ALL_SENTINELS
            .iter()
            .any(|sentinel| value.eq_ignore_ascii_case(sentinel))
    })
}

fn parse_query_date(
    field: &'static str,
    value: Option<String>,
) -> Result<Option<NaiveDate>, FilterError> {
    non_empty(value)
        .map(|value| {
            NaiveDate::parse_from_str(&value, QUERY_DATE_FORMAT)
                .map_err(|_| FilterError::InvalidDate { field, value })
        })
        .transpose()
}

/// Orders matching every set predicate, in their original order.
pub fn filter_orders(orders: &[Order], filters: &ReportFilters) -> Vec<Order> {
    orders
        .iter()
        .filter(|order| filters.matches(order))
        .cloned()
        .collect()
}

/// Singleton list with the order carrying `id`, or an empty list.
pub fn find_by_id(orders: &[Order], id: &str) -> Vec<Order> {
    orders
        .iter()
        .find(|order| order.id == id)
        .cloned()
        .into_iter()
        .collect()
}

/// Runs a report request. A non-empty order number bypasses the filters.
pub fn run_report(orders: &[Order], request: &ReportRequest) -> Vec<Order> {
    match request.order_id.as_deref().map(str::trim) {
        Some(id) if !id.is_empty() => find_by_id(orders, id),
        _ => filter_orders(orders, &request.filters),
    }
}

/// Distinct customer names, first occurrence wins.
pub fn unique_customers(orders: &[Order]) -> Vec<String> {
    let mut seen = HashSet::new();
    orders
        .iter()
        .filter(|order| seen.insert(order.user_name.as_str()))
        .map(|order| order.user_name.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{OrderItem, PaymentMethod};

    fn order(id: &str, name: &str, date: &str, status: OrderStatus, total: Option<f64>) -> Order {
        Order {
            id: id.to_string(),
            user_name: name.to_string(),
            user_email: format!("{}@example.com", name.to_lowercase()),
            date: date.to_string(),
            status,
            items: Vec::new(),
            subtotal: total,
            envio: None,
            total,
            payment_method: PaymentMethod::Card,
            rejection_reason: None,
        }
    }

    fn with_items(mut order: Order, names: &[&str]) -> Order {
        order.items = names
            .iter()
            .map(|name| OrderItem {
                name: name.to_string(),
                quantity: 1,
                price: Some(5.0),
            })
            .collect();
        order
    }

    fn sample() -> Vec<Order> {
        vec![
            with_items(
                order("1001", "Ana", "01/06/2024", OrderStatus::Completed, Some(25.0)),
                &["Miel de Abeja 250g"],
            ),
            with_items(
                order("1002", "Ana", "15/06/2024", OrderStatus::Rejected, Some(10.0)),
                &["Pan integral"],
            ),
            with_items(
                order("1003", "Luis", "30/06/2024", OrderStatus::Completed, None),
                &["Granola", "MIEL orgánica"],
            ),
            order("1004", "Rosa", "02/07/2024", OrderStatus::Pending, Some(8.5)),
        ]
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn ids(orders: &[Order]) -> Vec<&str> {
        orders.iter().map(|order| order.id.as_str()).collect()
    }

    #[test]
    fn empty_filters_return_everything() {
        let orders = sample();
        assert_eq!(filter_orders(&orders, &ReportFilters::default()), orders);
    }

    #[test]
    fn status_filter_keeps_exactly_matching_orders() {
        let orders = sample();
        let filters = ReportFilters {
            status: Some(OrderStatus::Completed),
            ..Default::default()
        };

        let result = filter_orders(&orders, &filters);
        assert_eq!(ids(&result), ["1001", "1003"]);
        assert!(result.iter().all(|o| o.status == OrderStatus::Completed));
    }

    #[test]
    fn two_order_scenario_returns_only_completed() {
        let orders = vec![
            order("1001", "Ana", "01/06/2024", OrderStatus::Completed, Some(25.0)),
            order("1002", "Ana", "15/06/2024", OrderStatus::Rejected, Some(10.0)),
        ];
        let request = ReportQuery {
            status: Some("Completado".into()),
            ..Default::default()
        }
        .into_request()
        .unwrap();

        assert_eq!(ids(&run_report(&orders, &request)), ["1001"]);
    }

    #[test]
    fn date_bounds_are_inclusive() {
        let orders = sample();
        let filters = ReportFilters {
            start_date: Some(date(2024, 6, 1)),
            end_date: Some(date(2024, 6, 30)),
            ..Default::default()
        };

        assert_eq!(ids(&filter_orders(&orders, &filters)), ["1001", "1002", "1003"]);
    }

    #[test]
    fn open_ended_date_ranges() {
        let orders = sample();
        let from = ReportFilters {
            start_date: Some(date(2024, 6, 15)),
            ..Default::default()
        };
        let until = ReportFilters {
            end_date: Some(date(2024, 6, 15)),
            ..Default::default()
        };

        assert_eq!(ids(&filter_orders(&orders, &from)), ["1002", "1003", "1004"]);
        assert_eq!(ids(&filter_orders(&orders, &until)), ["1001", "1002"]);
    }

    #[test]
    fn unparsable_order_dates_only_drop_out_of_date_filters() {
        let mut orders = sample();
        orders.push(order("1005", "Eva", "junio", OrderStatus::Pending, None));

        let bounded = ReportFilters {
            start_date: Some(date(2000, 1, 1)),
            ..Default::default()
        };
        assert!(!ids(&filter_orders(&orders, &bounded)).contains(&"1005"));
        assert!(ids(&filter_orders(&orders, &ReportFilters::default())).contains(&"1005"));
    }

    #[test]
    fn customer_matches_name_or_email() {
        let orders = sample();
        let by_name = ReportFilters {
            customer: Some("Luis".into()),
            ..Default::default()
        };
        let by_email = ReportFilters {
            customer: Some("luis@example.com".into()),
            ..Default::default()
        };

        assert_eq!(ids(&filter_orders(&orders, &by_name)), ["1003"]);
        assert_eq!(filter_orders(&orders, &by_name), filter_orders(&orders, &by_email));
    }

    #[test]
    fn product_type_is_case_insensitive_substring() {
        let orders = sample();
        let filters = ReportFilters {
            product_type: Some("miel".into()),
            ..Default::default()
        };

        assert_eq!(ids(&filter_orders(&orders, &filters)), ["1001", "1003"]);
    }

    #[test]
    fn filtering_is_idempotent_and_never_fabricates() {
        let orders = sample();
        let filters = ReportFilters {
            start_date: Some(date(2024, 6, 1)),
            customer: Some("Ana".into()),
            product_type: Some("pan".into()),
            ..Default::default()
        };

        let once = filter_orders(&orders, &filters);
        let twice = filter_orders(&once, &filters);
        assert_eq!(once, twice);
        assert!(once.iter().all(|o| orders.contains(o)));
        assert_eq!(ids(&once), ["1002"]);
    }

    #[test]
    fn order_id_takes_precedence_over_filters() {
        let orders = sample();
        let request = ReportRequest {
            order_id: Some("1002".into()),
            filters: ReportFilters {
                status: Some(OrderStatus::Completed),
                customer: Some("Luis".into()),
                ..Default::default()
            },
        };

        assert_eq!(ids(&run_report(&orders, &request)), ["1002"]);
    }

    #[test]
    fn unknown_order_id_yields_empty_report() {
        let request = ReportRequest {
            order_id: Some("9999".into()),
            ..Default::default()
        };
        assert!(run_report(&sample(), &request).is_empty());
    }

    #[test]
    fn unique_customers_has_no_duplicates() {
        assert_eq!(unique_customers(&sample()), ["Ana", "Luis", "Rosa"]);
        assert!(unique_customers(&[]).is_empty());
    }

    #[test]
    fn query_sentinels_disable_predicates() {
        let request = ReportQuery {
            status: Some("Todos".into()),
            customer: Some("all".into()),
            product_type: Some("  ".into()),
            order_id: Some("".into()),
            ..Default::default()
        }
        .into_request()
        .unwrap();

        assert_eq!(request, ReportRequest::default());
    }

    #[test]
    fn query_parses_iso_dates() {
        let request = ReportQuery {
            start_date: Some("2024-06-01".into()),
            end_date: Some("2024-06-30".into()),
            ..Default::default()
        }
        .into_request()
        .unwrap();

        assert_eq!(request.filters.start_date, Some(date(2024, 6, 1)));
        assert_eq!(request.filters.end_date, Some(date(2024, 6, 30)));
    }

    #[test]
    fn query_rejects_malformed_values() {
        let bad_date = ReportQuery {
            start_date: Some("01/06/2024".into()),
            ..Default::default()
        }
        .into_request();
        assert_eq!(
            bad_date,
            Err(FilterError::InvalidDate {
                field: "startDate",
                value: "01/06/2024".into()
            })
        );

        let bad_status = ReportQuery {
            status: Some("Enviado".into()),
            ..Default::default()
        }
        .into_request();
        assert_eq!(bad_status, Err(FilterError::InvalidStatus("Enviado".into())));
    }
}
