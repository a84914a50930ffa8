use std::fmt::{self, Display};
use std::sync::OnceLock;

use phf::phf_map;
use regex::{Regex, RegexBuilder};

use crate::{
    date::{utc_time_to_kyiv, NotamDate},
    fields::{Field, Fields},
    qline::QLine,
    Notam,
};

/// Location indicators the application requests NOTAMs for.
pub const TARGET_AIRPORTS: [&str; 9] = [
    "UUOO", "UUEE", "UUDD", "UUWW", "URWA", "UUBP", "URRV", "UKBB", "UKKK",
];

pub static AIRPORT_NAMES: phf::Map<&'static str, &'static str> = phf_map! {
    "UUOO" => "Voronezh (Chertovitskoye)",
    "UUEE" => "Moscow (Sheremetyevo)",
    "UUDD" => "Moscow (Domodedovo)",
    "UUWW" => "Moscow (Vnukovo)",
    "URWA" => "Astrakhan (Narimanovo)",
    "UUBP" => "Bryansk",
    "URRV" => "Rostov-on-Don (Platov)",
    "URWW" => "Volgograd (Gumrak)",
    "UKBB" => "Kyiv (Boryspil)",
    "UKKK" => "Kyiv (Zhuliany)",
};

// five letter codes, `XX` entries match any code sharing the first three letters
static Q_CODES: phf::Map<&'static str, &'static str> = phf_map! {
    "QRTCA" => "Temporary restricted area",
    "QRACA" => "Restricted area",
    "QRDCA" => "Danger area",
    "QRAXX" => "Area information",
    "QFAXX" => "Aerodrome information",
    "QFALC" => "Aerodrome closed",
    "QFAHW" => "Work in progress at aerodrome",
    "QLCAS" => "Runway closed",
    "QMXLC" => "Taxiway closed",
    "QOBCE" => "Obstacle erected",
    "QNVAS" => "Navigation aid unserviceable",
    "QNMXX" => "Navigation aid information",
    "QARLC" => "Air route segment closed",
    "QARXX" => "Air route information",
    "QWAXX" => "Weather information",
};

fn flight_level_regex() -> &'static Regex {
    static FL_RE: OnceLock<Regex> = OnceLock::new();
    FL_RE.get_or_init(|| {
        RegexBuilder::new(r"FL(\d+)")
            .case_insensitive(true)
            .build()
            .unwrap()
    })
}

fn metres_regex() -> &'static Regex {
    static METRES_RE: OnceLock<Regex> = OnceLock::new();
    METRES_RE.get_or_init(|| {
        RegexBuilder::new(r"(\d+)M\s*(AMSL|AGL)?")
            .case_insensitive(true)
            .build()
            .unwrap()
    })
}

fn schedule_regex() -> &'static Regex {
    static SCHEDULE_RE: OnceLock<Regex> = OnceLock::new();
    SCHEDULE_RE.get_or_init(|| Regex::new(r"^(\w+)\s+(\d{4})-(\d{4})$").unwrap())
}

pub fn airport_name(icao: &str) -> Option<&'static str> {
    AIRPORT_NAMES.get(icao).copied()
}

/// `(icao, label)` for every target location, in request order. Used to offer
/// the airport choices of a [`NotamFilter`](crate::filter::NotamFilter).
pub fn airport_choices() -> impl Iterator<Item = (&'static str, String)> {
    TARGET_AIRPORTS.into_iter().map(|icao| {
        let label = match airport_name(icao) {
            Some(name) => format!("{name} ({icao})"),
            None => icao.to_string(),
        };
        (icao, label)
    })
}

pub fn q_code_description(q: Option<&str>) -> &'static str {
    let Some(q) = q else {
        return "Not specified";
    };
    let code: String = QLine::parse(q)
        .code()
        .unwrap_or_default()
        .chars()
        .take(5)
        .collect();
    let subject: String = code.chars().take(3).chain("XX".chars()).collect();

    Q_CODES
        .get(code.as_str())
        .or_else(|| Q_CODES.get(subject.as_str()))
        .copied()
        .unwrap_or("Special notice")
}

/// Human reading of a vertical limit from item F or G.
pub fn altitude_description(value: Option<&str>) -> String {
    let Some(value) = value else {
        return "not specified".to_string();
    };

    match value.to_uppercase().as_str() {
        "SFC" | "GND" => return "from the surface".to_string(),
        "UNL" => return "unlimited".to_string(),
        _ => {}
    }

    if let Some(captures) = flight_level_regex().captures(value) {
        return format!("flight level FL{}", &captures[1]);
    }

    if let Some(captures) = metres_regex().captures(value) {
        let reference = match captures.get(2).map(|m| m.as_str().to_uppercase()) {
            Some(r) if r == "AMSL" => " above mean sea level",
            Some(_) => " above ground level",
            None => "",
        };
        return format!("{} metres{reference}", &captures[1]);
    }

    value.to_string()
}

/// Human reading of item D, times shifted to Kyiv.
pub fn schedule_description(fields: &Fields) -> String {
    let Some(schedule) = fields.d.as_deref() else {
        return "Not specified".to_string();
    };
    let upper = schedule.to_uppercase();
    if upper == "PERM" {
        return "Permanent".to_string();
    }

    let Some(captures) = schedule_regex().captures(&upper) else {
        return schedule.to_string();
    };

    let period = match &captures[1] {
        "DAILY" => "Daily",
        other => other,
    };
    let unlimited = fields
        .g
        .as_deref()
        .is_some_and(|g| g.eq_ignore_ascii_case("UNL"));
    let prefix = if unlimited { "Risk " } else { "" };

    format!(
        "{prefix}{period} from {} to {}",
        utc_time_to_kyiv(&captures[2]),
        utc_time_to_kyiv(&captures[3])
    )
}

/// Summary lines for one NOTAM, as shown next to the raw items.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Description {
    pub area: Option<String>,
    pub kind: Option<&'static str>,
    pub period: Option<String>,
    pub schedule: Option<String>,
    pub altitude: Option<String>,
}

fn local_or_raw(value: &str) -> String {
    NotamDate::parse(value).map_or_else(
        || value.to_string(),
        |date| date.local().to_string().replace(" Kyiv", ""),
    )
}

impl Description {
    pub fn of(notam: &Notam) -> Self {
        let fields = &notam.fields;

        let area = notam.location().map(|icao| {
            let fir = fields
                .q
                .as_deref()
                .and_then(|q| QLine::parse(q).fir())
                .unwrap_or_default();
            match airport_name(icao) {
                Some(name) => format!("{icao} - {name} (FIR {fir})"),
                None => format!("{icao} (FIR {fir})"),
            }
        });

        let period = match (fields.b.as_deref(), fields.c.as_deref()) {
            (Some(b), Some(c)) => Some(format!(
                "from {} to {} Kyiv time",
                local_or_raw(b),
                local_or_raw(c)
            )),
            (Some(b), None) => Some(format!("starting {} Kyiv time", local_or_raw(b))),
            _ => None,
        };

        let schedule = fields
            .d
            .as_deref()
            .filter(|d| !d.eq_ignore_ascii_case("PERM"))
            .map(|_| schedule_description(fields));

        let altitude = match (fields.f.as_deref(), fields.g.as_deref()) {
            (Some(f), Some(g)) => Some(format!(
                "{} - {}",
                altitude_description(Some(f)),
                altitude_description(Some(g))
            )),
            (Some(f), None) => Some(format!("lower limit {}", altitude_description(Some(f)))),
            _ => None,
        };

        Self {
            area,
            kind: fields.q.as_deref().map(|q| q_code_description(Some(q))),
            period,
            schedule,
            altitude,
        }
    }
}

impl Display for Description {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines = [
            ("Area", self.area.as_deref()),
            ("Type", self.kind),
            ("Validity", self.period.as_deref()),
            ("Schedule", self.schedule.as_deref()),
            ("Altitude", self.altitude.as_deref()),
        ];
        for (label, value) in lines {
            if let Some(value) = value {
                writeln!(f, "{label}: {value}")?;
            }
        }
        Ok(())
    }
}

impl Display for Notam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.id)?;
        for field in Field::ALL {
            if let Some(value) = self.fields.get(field) {
                writeln!(f, "{} {value}", field.marker())?;
            }
        }
        write!(f, "{}", Description::of(self))
    }
}

#[cfg(test)]
mod test {
    use chrono::{TimeZone as _, Utc};
    use pretty_assertions_sorted::assert_eq_sorted;

    use super::{
        airport_choices, altitude_description, q_code_description, schedule_description,
        Description, AIRPORT_NAMES, TARGET_AIRPORTS,
    };
    use crate::{fields::Fields, Notam};

    #[test]
    fn test_q_code_description() {
        assert_eq!(
            q_code_description(Some("UUEE/QRTCA/IV/NBO/A/000/999/5545N03735E005")),
            "Temporary restricted area"
        );
        assert_eq!(
            q_code_description(Some("UUEE/QFAAH/IV/NBO/A/000/999/5545N03735E005")),
            "Aerodrome information"
        );
        assert_eq!(q_code_description(Some("UUEE/QZZZZ/IV")), "Special notice");
        assert_eq!(q_code_description(Some("UUEE")), "Special notice");
        assert_eq!(q_code_description(None), "Not specified");
    }

    #[test]
    fn test_airport_choices() {
        for icao in TARGET_AIRPORTS {
            assert!(AIRPORT_NAMES.contains_key(icao), "{icao} has no name");
        }

        let choices: Vec<_> = airport_choices().collect();
        assert_eq!(choices.len(), TARGET_AIRPORTS.len());
        assert_eq!(
            choices[1],
            ("UUEE", "Moscow (Sheremetyevo) (UUEE)".to_string())
        );
        assert!(choices.iter().all(|(icao, _)| *icao != "URWW"));
    }

    #[test]
    fn test_altitude_description() {
        assert_eq!(altitude_description(Some("SFC")), "from the surface");
        assert_eq!(altitude_description(Some("gnd")), "from the surface");
        assert_eq!(altitude_description(Some("UNL")), "unlimited");
        assert_eq!(altitude_description(Some("FL195")), "flight level FL195");
        assert_eq!(
            altitude_description(Some("3000M AMSL")),
            "3000 metres above mean sea level"
        );
        assert_eq!(
            altitude_description(Some("150m agl")),
            "150 metres above ground level"
        );
        assert_eq!(altitude_description(Some("500M")), "500 metres");
        assert_eq!(altitude_description(Some("1000FT AMSL")), "1000FT AMSL");
        assert_eq!(altitude_description(None), "not specified");
    }

    #[test]
    fn test_schedule_description() {
        let mut fields = Fields {
            d: Some("DAILY 0600-1500".to_string()),
            ..Default::default()
        };
        assert_eq!(schedule_description(&fields), "Daily from 09:00 to 18:00");

        fields.g = Some("UNL".to_string());
        fields.d = Some("MON 2200-0200".to_string());
        assert_eq!(schedule_description(&fields), "Risk MON from 01:00 to 05:00");

        fields.d = Some("perm".to_string());
        assert_eq!(schedule_description(&fields), "Permanent");

        fields.d = Some("SR-SS".to_string());
        assert_eq!(schedule_description(&fields), "SR-SS");

        fields.d = None;
        assert_eq!(schedule_description(&fields), "Not specified");
    }

    #[test]
    fn test_description() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let fields = Fields {
            q: Some("UUWV/QRTCA/IV/BO/W/000/999/5545N03735E005".to_string()),
            a: Some("UUEE".to_string()),
            b: Some("2401010600".to_string()),
            c: Some("2401312359 EST".to_string()),
            d: Some("DAILY 0600-1500".to_string()),
            e: Some("AIRSPACE CLOSED".to_string()),
            f: Some("SFC".to_string()),
            g: Some("FL100".to_string()),
        };
        let notam = Notam::from_fields("A0001/24 NOTAMN".to_string(), fields, now).unwrap();

        let description = Description::of(&notam);
        assert_eq_sorted!(
            description,
            Description {
                area: Some("UUEE - Moscow (Sheremetyevo) (FIR UUWV)".to_string()),
                kind: Some("Temporary restricted area"),
                period: Some("from 01.01.2024 09:00 to 31.1.2024 23:59 EST Kyiv time".to_string()),
                schedule: Some("Daily from 09:00 to 18:00".to_string()),
                altitude: Some("from the surface - flight level FL100".to_string()),
            }
        );

        assert_eq!(
            notam.to_string(),
            "A0001/24 NOTAMN
Q) UUWV/QRTCA/IV/BO/W/000/999/5545N03735E005
A) UUEE
B) 2401010600
C) 2401312359 EST
D) DAILY 0600-1500
E) AIRSPACE CLOSED
F) SFC
G) FL100
Area: UUEE - Moscow (Sheremetyevo) (FIR UUWV)
Type: Temporary restricted area
Validity: from 01.01.2024 09:00 to 31.1.2024 23:59 EST Kyiv time
Schedule: Daily from 09:00 to 18:00
Altitude: from the surface - flight level FL100
"
        );
    }
}
