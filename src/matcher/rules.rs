//! Static guidance rule table
//!
//! Rules are listed in evaluation priority. Emergency keywords come first,
//! then the compound fever + respiratory/sensory pattern, then single-symptom
//! patterns. `FALLBACK_RULE` is used when nothing else matches.

use crate::types::Category;

/// When a rule fires
#[derive(Debug, Clone, Copy)]
pub enum Trigger {
    /// Any one keyword is present
    Any(&'static [&'static str]),

    /// Every group has at least one keyword present
    AllGroups(&'static [&'static [&'static str]]),

    /// Always fires
    Always,
}

impl Trigger {
    /// `normalized` must already be lower case
    pub fn matches(&self, normalized: &str) -> bool {
        match self {
            Trigger::Any(keywords) => contains_any(normalized, keywords),
            Trigger::AllGroups(groups) => groups.iter().all(|group| contains_any(normalized, group)),
            Trigger::Always => true,
        }
    }

    /// Flattened keyword list, for display
    pub fn keywords(&self) -> Vec<&'static str> {
        match self {
            Trigger::Any(keywords) => keywords.to_vec(),
            Trigger::AllGroups(groups) => groups.iter().flat_map(|g| g.iter().copied()).collect(),
            Trigger::Always => Vec::new(),
        }
    }
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

/// A keyword rule and the canned guidance it produces
#[derive(Debug, Clone, Copy)]
pub struct GuidanceRule {
    pub name: &'static str,
    pub trigger: Trigger,
    pub message: &'static str,
    pub category: Category,
}

pub const EMERGENCY_KEYWORDS: &[&str] = &[
    "emergency",
    "can't breathe",
    "cannot breathe",
    "can not breathe",
    "not breathing",
    "chest pain",
    "unconscious",
    "severe bleeding",
    "seizure",
];

pub const FEVER_KEYWORDS: &[&str] = &["fever", "temperature"];

pub const RESPIRATORY_SENSORY_KEYWORDS: &[&str] = &["cough", "breathing", "taste", "smell"];

pub const EMERGENCY_MESSAGE: &str = "Your message describes symptoms that may need emergency care. \
Please call your local emergency number (such as 911) or go to the nearest emergency department right now. \
Do not wait for symptoms to improve and do not drive yourself if you feel faint or short of breath.";

pub const COVID_PATTERN_MESSAGE: &str = "A fever together with a cough, breathing difficulty, or a change in taste or smell \
matches a common COVID-19 pattern. Please take a COVID-19 test as soon as you can and stay home, away from others, \
until you have a result. Monitor your breathing closely. If it becomes difficult to breathe, or you notice chest pain \
or confusion, seek emergency care immediately.";

pub const FALLBACK_MESSAGE: &str = "Based on the symptoms you've described, it could be a number of different conditions. \
To get a better understanding, could you provide more details about:\n\n\
- When did your symptoms start?\n\
- Are they getting better, worse, or staying the same?\n\
- Have you tried any treatment or medication so far?\n\
- Do you have any pre-existing health conditions?\n\n\
Remember, this is just basic guidance and not a replacement for professional medical advice. \
If your symptoms are severe or persistent, please consult a healthcare provider.";

/// Opening message of every conversation
pub const GREETING_MESSAGE: &str = "Hello! I'm your Health Assistant. I can help you understand your symptoms \
and provide basic health guidance. Note that I'm not a replacement for professional medical advice. \
What symptoms are you experiencing?";

/// Shown next to every conversation
pub const DISCLAIMER: &str = "This assistant provides general health guidance only and is not a substitute for \
professional medical advice, diagnosis, or treatment. Always seek the advice of your physician or other qualified \
health provider with any questions you may have regarding a medical condition.";

pub static RULES: &[GuidanceRule] = &[
    GuidanceRule {
        name: "emergency",
        trigger: Trigger::Any(EMERGENCY_KEYWORDS),
        message: EMERGENCY_MESSAGE,
        category: Category::Warning,
    },
    GuidanceRule {
        name: "covid_pattern",
        trigger: Trigger::AllGroups(&[FEVER_KEYWORDS, RESPIRATORY_SENSORY_KEYWORDS]),
        message: COVID_PATTERN_MESSAGE,
        category: Category::Info,
    },
    GuidanceRule {
        name: "fever",
        trigger: Trigger::Any(FEVER_KEYWORDS),
        message: "Fever can be a symptom of many conditions, including viral infections like flu or COVID-19, \
bacterial infections, or inflammatory conditions. Monitor your temperature regularly. If it exceeds 103°F (39.4°C) \
or persists for more than three days, please consult a healthcare provider. In the meantime, stay hydrated and rest.",
        category: Category::General,
    },
    GuidanceRule {
        name: "cough_throat",
        trigger: Trigger::Any(&["cough", "sore throat"]),
        message: "Coughing and sore throat are common symptoms of upper respiratory infections, allergies, or irritation. \
For relief, try drinking warm liquids, using throat lozenges, or taking over-the-counter pain relievers. If symptoms \
persist for more than a week, worsen suddenly, or are accompanied by difficulty breathing, please seek medical attention.",
        category: Category::General,
    },
    GuidanceRule {
        name: "headache",
        trigger: Trigger::Any(&["headache", "head hurts", "migraine"]),
        message: "Headaches can be caused by stress, dehydration, eyestrain, or illness. Try resting in a quiet, dark room, \
staying hydrated, and taking appropriate over-the-counter pain relievers. If your headache is severe, sudden, or \
accompanied by fever, confusion, stiff neck, or vision problems, please seek immediate medical attention.",
        category: Category::General,
    },
    GuidanceRule {
        name: "digestive",
        trigger: Trigger::Any(&["stomach", "nausea", "diarrhea", "vomit"]),
        message: "Digestive issues can be caused by food poisoning, viral gastroenteritis, or other conditions. It's important \
to stay hydrated with small sips of water or electrolyte solutions. Stick to bland foods like rice, toast, or bananas \
when you can eat. If symptoms persist beyond 48 hours, include severe pain, or if you notice blood, please consult a \
healthcare provider immediately.",
        category: Category::General,
    },
    GuidanceRule {
        name: "dizziness",
        trigger: Trigger::Any(&["dizzy", "dizziness", "faint"]),
        message: "Dizziness can be caused by dehydration, inner ear issues, low blood sugar, or more serious conditions. \
Make sure you're staying hydrated and eating regularly. Sit or lie down when feeling dizzy to prevent falls. If \
dizziness is severe, recurrent, or accompanied by chest pain or a severe headache, please seek immediate medical attention.",
        category: Category::General,
    },
    GuidanceRule {
        name: "skin",
        trigger: Trigger::Any(&["rash", "hives", "itchy skin"]),
        message: "Skin rashes can be caused by allergic reactions, infections, or other conditions. Avoid scratching and \
apply cool compresses for comfort. Over-the-counter hydrocortisone cream might help with itching. If the rash is \
widespread, painful, blistering, or accompanied by fever or difficulty breathing, please seek immediate medical attention.",
        category: Category::General,
    },
    GuidanceRule {
        name: "mental_health",
        trigger: Trigger::Any(&["anxiety", "anxious", "stress", "depress"]),
        message: "Feeling anxious, stressed, or low is common, especially during a pandemic, and it deserves attention. \
Regular sleep, physical activity, limiting news exposure, and staying connected with people you trust can help. \
If these feelings last for more than two weeks or interfere with daily life, please reach out to a mental health \
professional. If you ever have thoughts of harming yourself, contact a crisis line or emergency services right away.",
        category: Category::Info,
    },
    GuidanceRule {
        name: "vaccination",
        trigger: Trigger::Any(&["vaccin", "booster", "jab"]),
        message: "Staying up to date with vaccinations is one of the best ways to protect yourself and others. You can \
review your doses and book a booster appointment from your health records. Mild side effects such as a sore arm, \
tiredness, or a low fever for a day or two are normal and usually a sign your immune system is responding.",
        category: Category::Success,
    },
    GuidanceRule {
        name: "treatment",
        trigger: Trigger::Any(&["treatment", "medication", "medicine", "prescription", "pill"]),
        message: "For questions about treatment or medication, your pharmacist or healthcare provider is the best source \
of advice for your situation. Always follow the dosage on the label, do not combine medicines without checking for \
interactions, and let your provider know about any other medication or supplements you take.",
        category: Category::General,
    },
];

pub static FALLBACK_RULE: GuidanceRule = GuidanceRule {
    name: "fallback",
    trigger: Trigger::Always,
    message: FALLBACK_MESSAGE,
    category: Category::General,
};

/// Full evaluation order including the fallback
pub fn rules() -> impl Iterator<Item = &'static GuidanceRule> {
    RULES.iter().chain(std::iter::once(&FALLBACK_RULE))
}
