use crate::types::models::TokenHolder;

/// Which ranks of the full holder list end up in the rendered table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayWindow {
    Top(usize),
    /// 1-based, inclusive; `end: None` runs to the last holder.
    Ranks { start: usize, end: Option<usize> },
}

#[derive(Debug, Clone, Copy)]
pub struct DisplaySlice<'a> {
    pub first_rank: usize,
    pub rows: &'a [TokenHolder],
}

impl DisplayWindow {
    pub fn from_options(limit: usize, start: Option<usize>, end: Option<usize>) -> Self {
        if start.is_some() || end.is_some() {
            DisplayWindow::Ranks {
                start: start.unwrap_or(1).max(1),
                end,
            }
        } else {
            DisplayWindow::Top(limit.max(1))
        }
    }

    pub fn select<'a>(&self, holders: &'a [TokenHolder]) -> DisplaySlice<'a> {
        match *self {
            DisplayWindow::Top(limit) => DisplaySlice {
                first_rank: 1,
                rows: &holders[..limit.min(holders.len())],
            },
            DisplayWindow::Ranks { start, end } => {
                let start_idx = start.saturating_sub(1).min(holders.len());
                let end_idx = end.unwrap_or(holders.len()).min(holders.len()).max(start_idx);
                DisplaySlice {
                    first_rank: start_idx + 1,
                    rows: &holders[start_idx..end_idx],
                }
            }
        }
    }

    /// True when a rank window starts past the last holder.
    pub fn starts_beyond(&self, total: usize) -> bool {
        matches!(*self, DisplayWindow::Ranks { start, .. } if start > total)
    }

    pub fn describe(&self, slice: &DisplaySlice<'_>) -> String {
        match self {
            DisplayWindow::Top(_) => format!("top {}", slice.rows.len()),
            DisplayWindow::Ranks { .. } if slice.rows.is_empty() => "no ranks".to_string(),
            DisplayWindow::Ranks { .. } => format!(
                "ranks {}-{}",
                slice.first_rank,
                slice.first_rank + slice.rows.len() - 1
            ),
        }
    }
}
