use serde::{Deserialize, Serialize};
use tracing::trace;

/// The eight ICAO NOTAM items, in the order they appear in a bulletin.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Q,
    A,
    B,
    C,
    D,
    E,
    F,
    G,
}

impl Field {
    pub const ALL: [Field; 8] = [
        Field::Q,
        Field::A,
        Field::B,
        Field::C,
        Field::D,
        Field::E,
        Field::F,
        Field::G,
    ];

    pub fn marker(self) -> &'static str {
        match self {
            Field::Q => "Q)",
            Field::A => "A)",
            Field::B => "B)",
            Field::C => "C)",
            Field::D => "D)",
            Field::E => "E)",
            Field::F => "F)",
            Field::G => "G)",
        }
    }

    /// Fields that may follow this one on the same line.
    fn following(self) -> &'static [Field] {
        let index = self as usize;
        &Self::ALL[index + 1..]
    }
}

/// Trailer lines appended by the FAA after the last item.
const TRAILER_MARKERS: [&str; 2] = ["CREATED:", "SOURCE:"];

/// Lines starting with one of these end a multi-line item E.
const E_TERMINATORS: [&str; 8] = ["F)", "G)", "A)", "B)", "C)", "D)", "CREATED:", "SOURCE:"];

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fields {
    #[serde(rename = "Q", default, skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    #[serde(rename = "A", default, skip_serializing_if = "Option::is_none")]
    pub a: Option<String>,
    #[serde(rename = "B", default, skip_serializing_if = "Option::is_none")]
    pub b: Option<String>,
    #[serde(rename = "C", default, skip_serializing_if = "Option::is_none")]
    pub c: Option<String>,
    #[serde(rename = "D", default, skip_serializing_if = "Option::is_none")]
    pub d: Option<String>,
    #[serde(rename = "E", default, skip_serializing_if = "Option::is_none")]
    pub e: Option<String>,
    #[serde(rename = "F", default, skip_serializing_if = "Option::is_none")]
    pub f: Option<String>,
    #[serde(rename = "G", default, skip_serializing_if = "Option::is_none")]
    pub g: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Normal,
    InFieldE,
}

impl Fields {
    pub fn get(&self, field: Field) -> Option<&str> {
        match field {
            Field::Q => self.q.as_deref(),
            Field::A => self.a.as_deref(),
            Field::B => self.b.as_deref(),
            Field::C => self.c.as_deref(),
            Field::D => self.d.as_deref(),
            Field::E => self.e.as_deref(),
            Field::F => self.f.as_deref(),
            Field::G => self.g.as_deref(),
        }
    }

    fn slot_mut(&mut self, field: Field) -> &mut Option<String> {
        match field {
            Field::Q => &mut self.q,
            Field::A => &mut self.a,
            Field::B => &mut self.b,
            Field::C => &mut self.c,
            Field::D => &mut self.d,
            Field::E => &mut self.e,
            Field::F => &mut self.f,
            Field::G => &mut self.g,
        }
    }

    /// Tokenizes the body of a bulletin (every line after the identifier).
    ///
    /// Items other than E end at the next later item marker on the same line,
    /// the rest of the line is matched against the remaining markers. Item E
    /// runs until a line starting with a terminating marker. Repeated markers
    /// overwrite earlier values.
    pub fn parse<'a>(lines: impl IntoIterator<Item = &'a str>) -> Self {
        let mut fields = Fields::default();
        let mut state = State::Normal;

        for line in lines.into_iter().map(str::trim).filter(|l| !l.is_empty()) {
            if state == State::InFieldE && !E_TERMINATORS.iter().any(|m| line.starts_with(m)) {
                fields.append_e(line);
                continue;
            }

            state = fields.parse_line(line);
        }

        fields
    }

    fn parse_line(&mut self, line: &str) -> State {
        let mut rest = line;

        for field in Field::ALL {
            let Some(content) = rest.strip_prefix(field.marker()) else {
                continue;
            };

            let end = field
                .following()
                .iter()
                .map(|f| f.marker())
                .chain(TRAILER_MARKERS)
                .filter_map(|marker| content.find(marker))
                .min()
                .unwrap_or(content.len());

            let (extracted, remaining) = content.split_at(end);
            trace!("{field:?}: {extracted:?}");
            *self.slot_mut(field) = Some(extracted.trim().to_string());
            rest = remaining.trim();

            if field == Field::E && rest.is_empty() {
                return State::InFieldE;
            }
        }

        State::Normal
    }

    fn append_e(&mut self, line: &str) {
        match &mut self.e {
            Some(e) if !e.is_empty() => {
                e.push('\n');
                e.push_str(line);
            }
            e => *e = Some(line.to_string()),
        }
    }
}
