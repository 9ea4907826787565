//! Bar charts for the dashboard.
//!
//! Charts are Plotly figures (`data` + `layout`) so they serialize
//! straight into JSON that plotly.js can render.

use crate::models::{FamilyFareRow, GenderSurvival, Sex};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Viridis endpoints and midpoint, one per ticket class.
const CLASS_COLORS: [&str; 3] = ["#440154", "#21918c", "#fde725"];

/// Colors used when drawing charts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartStyle {
    pub male_color: String,
    pub female_color: String,
    pub background: String,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            male_color: "blue".to_string(),
            female_color: "pink".to_string(),
            background: "white".to_string(),
        }
    }
}

impl ChartStyle {
    fn sex_color(&self, sex: Sex) -> &str {
        match sex {
            Sex::Male => &self.male_color,
            Sex::Female => &self.female_color,
        }
    }
}

/// A renderable Plotly figure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chart {
    /// DOM id the figure is drawn into.
    pub id: String,
    pub data: Vec<BarTrace>,
    pub layout: Layout,
}

/// One series of bars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarTrace {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub x: Vec<String>,
    pub y: Vec<f64>,
    pub marker: Marker,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marker {
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub title: Title,
    pub xaxis: Axis,
    pub yaxis: Axis,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barmode: Option<String>,
    pub legend: Legend,
    pub paper_bgcolor: String,
    pub plot_bgcolor: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Title {
    pub text: String,
    /// Horizontal position; 0.5 centers the title.
    pub x: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    pub title: AxisTitle,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<[f64; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tickformat: Option<String>,
    /// `"array"` to order categories by `categoryarray`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categoryorder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categoryarray: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisTitle {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Legend {
    pub title: AxisTitle,
}

impl Axis {
    fn titled(text: &str) -> Self {
        Self {
            title: AxisTitle {
                text: text.to_string(),
            },
            range: None,
            tickformat: None,
            categoryorder: None,
            categoryarray: None,
        }
    }
}

impl Layout {
    fn new(title: &str, xaxis: Axis, yaxis: Axis, legend: &str, style: &ChartStyle) -> Self {
        Self {
            title: Title {
                text: title.to_string(),
                x: 0.5,
            },
            xaxis,
            yaxis,
            barmode: None,
            legend: Legend {
                title: AxisTitle {
                    text: legend.to_string(),
                },
            },
            paper_bgcolor: style.background.clone(),
            plot_bgcolor: style.background.clone(),
        }
    }
}

impl Chart {
    /// Figure as compact JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// "Survival Rate by Gender": one bar per sex, y axis as a percentage.
pub fn survival_by_gender_chart(rows: &[GenderSurvival], style: &ChartStyle) -> Chart {
    let data = rows
        .iter()
        .map(|row| BarTrace {
            kind: "bar".to_string(),
            name: row.sex.to_string(),
            x: vec![row.sex.to_string()],
            y: vec![row.survival_rate],
            marker: Marker {
                color: style.sex_color(row.sex).to_string(),
            },
        })
        .collect();

    let yaxis = Axis {
        range: Some([0.0, 1.0]),
        tickformat: Some(".0%".to_string()),
        ..Axis::titled("Survival Rate")
    };

    Chart {
        id: "survival-by-gender".to_string(),
        data,
        layout: Layout::new(
            "Survival Rate by Gender",
            Axis::titled("Gender"),
            yaxis,
            "Gender",
            style,
        ),
    }
}

/// "Top N Families by Average Fare Paid": bars grouped by ticket class.
pub fn top_families_chart(rows: &[FamilyFareRow], top_n: usize, style: &ChartStyle) -> Chart {
    let mut by_class: BTreeMap<u8, (Vec<String>, Vec<f64>)> = BTreeMap::new();

    for row in rows {
        let (names, fares) = by_class.entry(row.pclass).or_default();
        names.push(row.last_name.clone());
        fares.push(row.average_fare);
    }

    let data = by_class
        .into_iter()
        .map(|(pclass, (x, y))| BarTrace {
            kind: "bar".to_string(),
            name: pclass.to_string(),
            x,
            y,
            marker: Marker {
                color: class_color(pclass).to_string(),
            },
        })
        .collect();

    // Per-class traces would otherwise reorder the x axis by class
    let mut ranked: Vec<String> = Vec::new();
    for row in rows {
        if !ranked.contains(&row.last_name) {
            ranked.push(row.last_name.clone());
        }
    }

    let xaxis = Axis {
        categoryorder: Some("array".to_string()),
        categoryarray: Some(ranked),
        ..Axis::titled("Family Last Name")
    };

    let mut layout = Layout::new(
        &format!("Top {} Families by Average Fare Paid", top_n),
        xaxis,
        Axis::titled("Average Fare"),
        "Passenger Class",
        style,
    );
    layout.barmode = Some("group".to_string());

    Chart {
        id: "top-families".to_string(),
        data,
        layout,
    }
}

fn class_color(pclass: u8) -> &'static str {
    match pclass {
        1..=3 => CLASS_COLORS[usize::from(pclass) - 1],
        _ => "#7f7f7f",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gender_rows() -> Vec<GenderSurvival> {
        vec![
            GenderSurvival {
                sex: Sex::Female,
                total_passengers: 4,
                survivors: 3,
                survival_rate: 0.75,
            },
            GenderSurvival {
                sex: Sex::Male,
                total_passengers: 5,
                survivors: 1,
                survival_rate: 0.2,
            },
        ]
    }

    fn family(last_name: &str, pclass: u8, average_fare: f64) -> FamilyFareRow {
        FamilyFareRow {
            last_name: last_name.to_string(),
            pclass,
            average_fare,
            count: 2,
        }
    }

    #[test]
    fn test_gender_chart_colors_and_axis() {
        let chart = survival_by_gender_chart(&gender_rows(), &ChartStyle::default());

        assert_eq!(chart.data.len(), 2);
        assert_eq!(chart.data[0].marker.color, "pink");
        assert_eq!(chart.data[1].marker.color, "blue");
        assert_eq!(chart.data[1].y, vec![0.2]);
        assert_eq!(chart.layout.yaxis.range, Some([0.0, 1.0]));
        assert_eq!(chart.layout.title.text, "Survival Rate by Gender");
        assert_eq!(chart.layout.title.x, 0.5);
    }

    #[test]
    fn test_family_chart_groups_by_class() {
        let rows = vec![
            family("Fortune", 1, 263.0),
            family("Palsson", 3, 21.075),
            family("Carter", 1, 120.0),
        ];

        let chart = top_families_chart(&rows, 10, &ChartStyle::default());

        assert_eq!(chart.layout.title.text, "Top 10 Families by Average Fare Paid");
        assert_eq!(chart.layout.barmode.as_deref(), Some("group"));
        assert_eq!(chart.data.len(), 2);
        assert_eq!(chart.data[0].name, "1");
        assert_eq!(chart.data[0].x, vec!["Fortune", "Carter"]);
        assert_eq!(chart.data[1].marker.color, "#fde725");
    }

    #[test]
    fn test_family_chart_keeps_rank_order() {
        let rows = vec![
            family("Fortune", 1, 263.0),
            family("Palsson", 3, 150.0),
            family("Carter", 1, 120.0),
            family("Palsson", 2, 90.0),
        ];

        let chart = top_families_chart(&rows, 4, &ChartStyle::default());

        assert_eq!(chart.layout.xaxis.categoryorder.as_deref(), Some("array"));
        assert_eq!(
            chart.layout.xaxis.categoryarray,
            Some(vec![
                "Fortune".to_string(),
                "Palsson".to_string(),
                "Carter".to_string()
            ])
        );

        let value: serde_json::Value = serde_json::from_str(&chart.to_json().unwrap()).unwrap();
        assert_eq!(value["layout"]["xaxis"]["categoryarray"][1], "Palsson");
    }

    #[test]
    fn test_chart_json_shape() {
        let chart = survival_by_gender_chart(&gender_rows(), &ChartStyle::default());
        let json = chart.to_json().unwrap();

        assert!(json.contains("\"type\":\"bar\""));
        assert!(json.contains("\"tickformat\":\".0%\""));
        assert!(!json.contains("barmode"));
        assert!(!json.contains("categoryorder"));

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["layout"]["xaxis"]["title"]["text"], "Gender");
    }
}
