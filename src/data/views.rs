use serde::Serialize;

use super::aggregate::{
    frequency_count, group_mean, group_summary, histogram, histogram_by_group, pivot_mean,
    scatter_points, Bucket, GroupHistogram, GroupMeans, GroupSummary, PivotTable, ScatterPoint,
    ValueCount,
};
use super::error::ColumnNotFound;
use super::model::Table;

pub const PRICE_BUCKETS: usize = 20;
pub const RATINGS_BUCKETS: usize = 30;

/// Every chart of the listings dashboards, as plain data.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardViews {
    pub listings: usize,
    pub brand_popularity: Vec<ValueCount>,
    pub battery_type_distribution: Vec<ValueCount>,
    pub ratings_by_brand_and_battery: PivotTable,
    pub price_distribution: Vec<Bucket>,
    pub ratings_distribution: Vec<Bucket>,
    /// Ratings histogram stacked by brand.
    pub ratings_distribution_by_brand: Vec<GroupHistogram>,
    pub average_price_by_battery: GroupMeans,
    pub price_by_brand: Vec<GroupSummary>,
    pub price_vs_ratings: Vec<ScatterPoint>,
    pub ratings_vs_discounted_price: Vec<ScatterPoint>,
    pub battery_vs_price: Vec<ScatterPoint>,
}

impl DashboardViews {
    pub fn build(table: &Table) -> Result<Self, ColumnNotFound> {
        Ok(DashboardViews {
            listings: table.len(),
            brand_popularity: frequency_count(table, "brand")?,
            battery_type_distribution: frequency_count(table, "battery_type")?,
            ratings_by_brand_and_battery: pivot_mean(table, "brand", "battery_capacity", "ratings")?,
            price_distribution: histogram(table, "discounted_price", PRICE_BUCKETS)?,
            ratings_distribution: histogram(table, "ratings", RATINGS_BUCKETS)?,
            ratings_distribution_by_brand: histogram_by_group(
                table,
                "ratings",
                "brand",
                RATINGS_BUCKETS,
            )?,
            average_price_by_battery: group_mean(table, "battery_capacity", "discounted_price")?,
            price_by_brand: group_summary(table, "brand", "discounted_price")?,
            price_vs_ratings: scatter_points(table, "original_price", "ratings", "model", "brand")?,
            ratings_vs_discounted_price: scatter_points(
                table,
                "discounted_price",
                "ratings",
                "model",
                "brand",
            )?,
            battery_vs_price: scatter_points(
                table,
                "battery_capacity",
                "original_price",
                "model",
                "brand",
            )?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::compare::COMPARISON_ATTRIBUTES;
    use crate::data::model::{Column, ColumnKind, Record, Value, NUMERIC_COLUMNS};

    fn listing(brand: &str, model: &str, price: f64, rating: Option<f64>, battery: f64) -> Record {
        Record::new(
            COMPARISON_ATTRIBUTES
                .iter()
                .map(|(col, _)| match *col {
                    "brand" => Value::text(brand),
                    "model" => Value::text(model),
                    "original_price" => Value::Number(price * 1.2),
                    "discounted_price" => Value::Number(price),
                    "ratings" => rating.map_or(Value::Null, Value::Number),
                    "battery_capacity" => Value::Number(battery),
                    "battery_type" => Value::text("Li-ion"),
                    c if NUMERIC_COLUMNS.contains(&c) => Value::Null,
                    _ => Value::text(""),
                })
                .collect(),
        )
    }

    #[test]
    fn builds_every_view() {
        let columns = COMPARISON_ATTRIBUTES
            .iter()
            .map(|(col, _)| {
                let kind = if NUMERIC_COLUMNS.contains(col) {
                    ColumnKind::Numeric
                } else {
                    ColumnKind::Text
                };
                Column::new(*col, kind)
            })
            .collect();
        let table = Table::new(
            columns,
            vec![
                listing("X", "X1", 10000.0, Some(4.0), 5000.0),
                listing("X", "X2", 12000.0, None, 6000.0),
                listing("Y", "Y1", 8000.0, Some(3.5), 5000.0),
            ],
        );

        let views = DashboardViews::build(&table).unwrap();
        assert_eq!(views.listings, 3);
        assert_eq!(views.brand_popularity[0].value, Value::text("X"));
        assert_eq!(views.brand_popularity[0].count, 2);
        assert_eq!(views.battery_type_distribution.len(), 1);
        assert_eq!(views.price_distribution.len(), PRICE_BUCKETS);
        assert_eq!(views.ratings_distribution.len(), RATINGS_BUCKETS);
        assert_eq!(
            views.average_price_by_battery.mean_of(&Value::Number(5000.0)),
            Some(9000.0)
        );
        assert_eq!(views.price_by_brand.len(), 2);
        assert_eq!(views.price_vs_ratings.len(), 2);
        assert_eq!(views.ratings_vs_discounted_price.len(), 2);
        let first = &views.ratings_vs_discounted_price[0];
        assert_eq!((first.x, first.y), (10000.0, 4.0));
        assert_eq!(first.series, Value::text("X"));
        assert_eq!(views.ratings_vs_discounted_price[1].series, Value::text("Y"));
        assert_eq!(views.ratings_distribution_by_brand.len(), 2);
        assert!(views
            .ratings_distribution_by_brand
            .iter()
            .all(|g| g.buckets.len() == RATINGS_BUCKETS));
        assert_eq!(views.battery_vs_price.len(), 3);
        assert_eq!(
            views
                .ratings_by_brand_and_battery
                .get(&Value::text("X"), &Value::Number(6000.0)),
            None
        );

        let json = serde_json::to_value(&views).unwrap();
        assert_eq!(json["brand_popularity"][0]["value"], "X");
        assert_eq!(json["battery_vs_price"][2]["series"], "Y");
    }
}
