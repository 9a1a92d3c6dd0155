use serde::Serialize;

/// Display tier for a grade on either the 9-1 numeric scale or the A*-U letter scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GradeTier {
    Top,
    High,
    Mid,
    LowerMid,
    Low,
}

impl GradeTier {
    pub fn classify(grade: &str) -> Self {
        if let Some(value) = leading_integer(grade) {
            return match value {
                v if v >= 8 => Self::Top,
                v if v >= 6 => Self::High,
                v if v >= 4 => Self::Mid,
                _ => Self::Low,
            };
        }

        let upper = grade.to_uppercase();
        if upper.contains("A*") {
            return Self::Top;
        }
        match upper.as_str() {
            "A" => Self::High,
            "B" => Self::Mid,
            "C" | "D" => Self::LowerMid,
            _ => Self::Low,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::High => "high",
            Self::Mid => "mid",
            Self::LowerMid => "lower-mid",
            Self::Low => "low",
        }
    }

    /// Sort key, highest tier first.
    pub const fn rank(self) -> u8 {
        match self {
            Self::Top => 0,
            Self::High => 1,
            Self::Mid => 2,
            Self::LowerMid => 3,
            Self::Low => 4,
        }
    }
}

/// Lenient integer parse: optional sign then leading digits, trailing text ignored ("6-6" -> 6).
fn leading_integer(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    let value: i64 = digits[..end].parse().ok()?;
    Some(if negative { -value } else { value })
}
