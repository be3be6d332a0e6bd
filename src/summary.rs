// 📊 Aggregation Engine
// Totals per category, always in the fixed Food/Travel/Bills/Other order

use crate::expense::{Category, Expense};

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    pub category: Category,
    pub total: f64,
    /// Share of the grand total, whole percent, capped at 100
    pub percentage: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub total: f64,
    pub per_category: Vec<CategoryTotal>,
}

impl Summary {
    pub fn for_category(&self, category: Category) -> Option<&CategoryTotal> {
        self.per_category.iter().find(|c| c.category == category)
    }
}

/// Summarize whatever collection is passed in (usually the filtered view).
pub fn summarize(expenses: &[Expense]) -> Summary {
    let total: f64 = expenses.iter().map(|e| e.amount).sum();

    let per_category = Category::ALL
        .iter()
        .map(|&category| {
            let category_total: f64 = expenses
                .iter()
                .filter(|e| e.category == category)
                .map(|e| e.amount)
                .sum();

            CategoryTotal {
                category,
                total: category_total,
                percentage: percentage_of(category_total, total),
            }
        })
        .collect();

    Summary {
        total,
        per_category,
    }
}

/// Each share is rounded on its own, so the four percentages may not add up
/// to exactly 100.
fn percentage_of(part: f64, total: f64) -> i64 {
    if total > 0.0 {
        // Half rounds up (towards +inf), also for negative shares
        let rounded = (part / total * 100.0 + 0.5).floor() as i64;
        rounded.min(100)
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_expense(amount: f64, category: Category) -> Expense {
        Expense {
            id: uuid::Uuid::new_v4().to_string(),
            amount,
            date: "2024-01-01".to_string(),
            note: String::new(),
            category,
        }
    }

    #[test]
    fn test_empty_collection() {
        let summary = summarize(&[]);
        assert_eq!(summary.total, 0.0);
        assert_eq!(summary.per_category.len(), 4);
        for item in &summary.per_category {
            assert_eq!(item.total, 0.0);
            assert_eq!(item.percentage, 0);
        }
    }

    #[test]
    fn test_fixed_category_order() {
        let summary = summarize(&[
            create_test_expense(5.0, Category::Other),
            create_test_expense(5.0, Category::Bills),
        ]);
        let order: Vec<Category> = summary.per_category.iter().map(|c| c.category).collect();
        assert_eq!(order, Category::ALL.to_vec());
    }

    #[test]
    fn test_single_category_is_full_share() {
        let summary = summarize(&[create_test_expense(100.0, Category::Food)]);
        assert_eq!(summary.total, 100.0);
        assert_eq!(summary.for_category(Category::Food).unwrap().percentage, 100);
        assert_eq!(summary.for_category(Category::Travel).unwrap().percentage, 0);
        assert_eq!(summary.for_category(Category::Bills).unwrap().percentage, 0);
        assert_eq!(summary.for_category(Category::Other).unwrap().percentage, 0);
    }

    #[test]
    fn test_category_totals_partition_total() {
        let expenses = vec![
            create_test_expense(12.5, Category::Food),
            create_test_expense(7.25, Category::Food),
            create_test_expense(300.0, Category::Travel),
            create_test_expense(89.99, Category::Bills),
            create_test_expense(1.0, Category::Other),
        ];
        let summary = summarize(&expenses);
        let sum: f64 = summary.per_category.iter().map(|c| c.total).sum();
        assert!((sum - summary.total).abs() < 1e-9);
    }

    #[test]
    fn test_independent_rounding_can_miss_100() {
        // Three equal thirds: 33 + 33 + 33 = 99
        let summary = summarize(&[
            create_test_expense(1.0, Category::Food),
            create_test_expense(1.0, Category::Travel),
            create_test_expense(1.0, Category::Bills),
        ]);
        let sum: i64 = summary.per_category.iter().map(|c| c.percentage).sum();
        assert_eq!(sum, 99);
    }

    #[test]
    fn test_half_rounds_up() {
        // 1/8 = 12.5% → 13, 7/8 = 87.5% → 88
        let summary = summarize(&[
            create_test_expense(1.0, Category::Food),
            create_test_expense(7.0, Category::Other),
        ]);
        assert_eq!(summary.for_category(Category::Food).unwrap().percentage, 13);
        assert_eq!(summary.for_category(Category::Other).unwrap().percentage, 88);
    }

    #[test]
    fn test_share_is_capped_at_100() {
        // Corrupt stored data with a negative amount pushes one share past 100
        let summary = summarize(&[
            create_test_expense(150.0, Category::Food),
            create_test_expense(-50.0, Category::Bills),
        ]);
        assert_eq!(summary.total, 100.0);
        assert_eq!(summary.for_category(Category::Food).unwrap().percentage, 100);
        assert_eq!(summary.for_category(Category::Bills).unwrap().percentage, -50);
    }

    #[test]
    fn test_non_positive_total_gives_zero_shares() {
        let summary = summarize(&[create_test_expense(-10.0, Category::Food)]);
        assert_eq!(summary.total, -10.0);
        assert_eq!(summary.for_category(Category::Food).unwrap().percentage, 0);
    }
}
