use kudos_types::models::KudosCategory;

/// Presentation metadata for a category badge in the feed view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryBadge {
    pub icon: &'static str,
    pub label: &'static str,
}

pub fn category_badge(category: KudosCategory) -> CategoryBadge {
    match category {
        KudosCategory::GreatJob => CategoryBadge {
            icon: "⭐",
            label: "Great Job",
        },
        KudosCategory::ThankYou => CategoryBadge {
            icon: "🙏",
            label: "Thank You",
        },
        KudosCategory::Teamwork => CategoryBadge {
            icon: "🤝",
            label: "Teamwork",
        },
    }
}

#[cfg(test)]
mod tests {
    use kudos_types::models::KUDOS_CATEGORIES;

    use super::category_badge;

    #[test]
    fn every_category_has_a_badge_matching_its_wire_label() {
        for category in KUDOS_CATEGORIES {
            assert_eq!(category_badge(category).label, category.as_str());
        }
    }
}
