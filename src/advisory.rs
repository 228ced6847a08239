// Maps a weather condition to an outfit/safety advisory. The table is
// evaluated top to bottom and the first matching rule wins, so a description
// mentioning both clouds and rain resolves to the rain advisory.

struct ConditionRule {
    condition: &'static [&'static str],
    description: &'static [&'static str],
    advice: &'static str,
}

const RULES: &[ConditionRule] = &[
    ConditionRule {
        condition: &["rain"],
        description: &["rain"],
        advice: "☔ It's rainy — wear a waterproof jacket and carry an umbrella!",
    },
    ConditionRule {
        condition: &["clear"],
        description: &["sunny"],
        advice: "😎 Clear skies — go for light cotton clothes, sunglasses, and drink water!",
    },
    ConditionRule {
        condition: &["cloud"],
        description: &["overcast"],
        advice: "☁️ Cloudy — you might want a light hoodie or a comfy tee.",
    },
    ConditionRule {
        condition: &["snow"],
        description: &[],
        advice: "❄️ Snowy weather — wear a thick jacket, gloves, and boots!",
    },
    ConditionRule {
        condition: &["drizzle"],
        description: &[],
        advice: "🌦️ Light drizzle — keep a compact umbrella or raincoat handy.",
    },
    ConditionRule {
        condition: &["mist", "fog"],
        description: &[],
        advice: "🌫️ Misty/foggy — wear visible colors and be cautious outdoors.",
    },
    ConditionRule {
        condition: &["haze", "smoke"],
        description: &[],
        advice: "😷 Air quality seems poor — wear a mask and avoid staying out too long.",
    },
    ConditionRule {
        condition: &["dust", "sand"],
        description: &[],
        advice: "🌬️ Dusty — wear a mask or scarf to protect yourself!",
    },
    ConditionRule {
        condition: &["thunder"],
        description: &[],
        advice: "⚡ Thunderstorms — better stay indoors and unplug electronics!",
    },
    ConditionRule {
        condition: &["ash", "volcanic"],
        description: &[],
        advice: "🌋 Volcanic ash detected — stay indoors and keep windows shut.",
    },
    ConditionRule {
        condition: &["squall"],
        description: &[],
        advice: "💨 Strong winds ahead — secure loose items and wear a windbreaker!",
    },
    ConditionRule {
        condition: &["tornado"],
        description: &[],
        advice: "🌪️ Tornado alert — stay in a safe shelter immediately!",
    },
];

/// Returns the advisory for a condition/description pair. Both inputs are
/// expected to be lower-cased already.
pub fn advise(condition: &str, description: &str) -> String {
    for rule in RULES {
        let hit = rule.condition.iter().any(|k| condition.contains(k))
            || rule.description.iter().any(|k| description.contains(k));
        if hit {
            return rule.advice.to_string();
        }
    }
    format!("🌍 The weather is {description}. Dress comfortably and stay safe!")
}
