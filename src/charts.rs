//! Categorical color scales and axis tick helpers for the chart layer.
//!
//! The scales for treemap and sunburst charts are keyed by the full account
//! list and the currency scale by the commodity list, so a category keeps its
//! color across re-renders and across reports. Assignments only change when
//! the underlying domain does.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use palette::{Clamp, FromColor, Lch, Srgb};

use crate::reactive::{Derived, Store, Zip};

/// The well-known 10-hue categorical scheme used by most charts.
pub const COLORS10: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

/// Extended paired palette for charts that need many distinguishable
/// categories, such as treemaps over deep account trees.
pub const COLORS20: [&str; 20] = [
    "#1f77b4", "#aec7e8", "#ff7f0e", "#ffbb78", "#2ca02c", "#98df8a", "#d62728", "#ff9896",
    "#9467bd", "#c5b0d5", "#8c564b", "#c49c94", "#e377c2", "#f7b6d2", "#7f7f7f", "#c7c7c7",
    "#bcbd22", "#dbdb8d", "#17becf", "#9edae5",
];

/// Filter ticks so that axis labels do not overlap.
///
/// Keeps every `ceil(len / count)`-th label, starting with the first. The
/// result may exceed `count` by the rounding slack of the ceiling division;
/// the axis layer accepts that. `count` must be positive.
pub fn filter_ticks(domain: &[String], count: usize) -> Vec<String> {
    debug_assert!(count > 0, "tick count must be positive");
    if domain.len() <= count {
        return domain.to_vec();
    }
    let stride = domain.len().div_ceil(count);
    domain
        .iter()
        .enumerate()
        .filter(|(index, _)| index % stride == 0)
        .map(|(_, label)| label.clone())
        .collect()
}

/// Generate `count` colors of equal perceived brightness.
///
/// Hues are spaced evenly on the CIE LCh wheel with fixed chroma and
/// luminance, so the swatches differ in hue only. The wheel is entered at
/// 270°; changing the offset would reshuffle every generated palette, so it
/// is part of the contract.
pub fn hcl_color_range(count: usize) -> Vec<String> {
    hcl_color_range_with(count, 45.0, 70.0)
}

pub fn hcl_color_range_with(count: usize, chroma: f32, luminance: f32) -> Vec<String> {
    debug_assert!(count > 0, "color count must be positive");
    let delta = 360.0 / count as f32;
    (0..count)
        .map(|index| {
            let hue = (index as f32 * delta + 270.0) % 360.0;
            to_hex(Lch::new(luminance, chroma, hue))
        })
        .collect()
}

fn to_hex(color: Lch) -> String {
    let rgb: Srgb<u8> = Srgb::from_color(color).clamp().into_format();
    format!("#{:02x}{:02x}{:02x}", rgb.red, rgb.green, rgb.blue)
}

/// A categorical scale assigning palette colors to keys in first-seen order,
/// cycling when there are more keys than colors.
///
/// Keys outside the initial domain extend it in encounter order, so a scale
/// never fails to produce a color; for a fixed domain the same key always
/// maps to the same color within one instance.
pub struct OrdinalScale {
    palette: Vec<String>,
    assigned: RwLock<HashMap<String, usize>>,
}

impl OrdinalScale {
    pub fn new<I, S>(palette: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let palette: Vec<String> = palette.into_iter().map(Into::into).collect();
        debug_assert!(!palette.is_empty(), "palette must not be empty");
        Self {
            palette,
            assigned: RwLock::new(HashMap::new()),
        }
    }

    pub fn with_domain<I, S>(palette: I, domain: &[String]) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let scale = Self::new(palette);
        {
            let mut assigned = match scale.assigned.write() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            for key in domain {
                let next = assigned.len();
                assigned.entry(key.clone()).or_insert(next);
            }
        }
        scale
    }

    /// The color for `key`, stable for the lifetime of this scale.
    pub fn color(&self, key: &str) -> String {
        let mut assigned = match self.assigned.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let next = assigned.len();
        let index = *assigned.entry(key.to_string()).or_insert(next);
        self.palette[index % self.palette.len()].clone()
    }
}

/// The color scales for the charts.
///
/// The treemap and sunburst scales both track the full account list but are
/// separate instances: sunburst charts need many distinguishable leaf colors
/// and must not compete with other account scales for early palette indices.
/// The currency scale tracks the configured operating currencies (in their
/// configured order) followed by the remaining currencies, sorted. The
/// scatterplot scale is static and assigns colors to series keys in the
/// order the chart first encounters them.
pub struct ColorScales {
    pub treemap: Derived<Store<Vec<String>>, Arc<OrdinalScale>>,
    pub sunburst: Derived<Store<Vec<String>>, Arc<OrdinalScale>>,
    pub currencies: Derived<Zip<Store<Vec<String>>, Store<Vec<String>>>, Arc<OrdinalScale>>,
    pub scatterplot: Arc<OrdinalScale>,
}

impl ColorScales {
    pub fn new(
        accounts: Store<Vec<String>>,
        operating_currencies: Store<Vec<String>>,
        currencies_sorted: Store<Vec<String>>,
    ) -> Self {
        let treemap = Derived::new(accounts.clone(), |accounts: &Vec<String>| {
            Arc::new(OrdinalScale::with_domain(COLORS20, accounts))
        });
        let sunburst = Derived::new(accounts, |accounts: &Vec<String>| {
            Arc::new(OrdinalScale::with_domain(COLORS10, accounts))
        });
        let currencies = Derived::new(
            Zip::new(operating_currencies, currencies_sorted),
            |(operating, sorted): &(Vec<String>, Vec<String>)| {
                let domain: Vec<String> = operating.iter().chain(sorted.iter()).cloned().collect();
                Arc::new(OrdinalScale::with_domain(COLORS10, &domain))
            },
        );
        Self {
            treemap,
            sunburst,
            currencies,
            scatterplot: Arc::new(OrdinalScale::new(COLORS10)),
        }
    }
}
