/*!
The on-disk line format for `Patient`s.

```text
#id|name|age|gender|address|contact|diagnosis
1|Jane Doe|30|F|1 Main St|5551234|
2|John Roe|41|M|9 Elm Rd|5550000|Hypertension
```

Nothing is quoted or escaped. A `|` inside a text field shifts every
following field, and the result fails to decode (wrong field count or a
non-numeric age) rather than coming back as a wrong record; keeping `|`
out of free text is the job of whoever collects it.
*/
use crate::error::{Error, Result};
use crate::patient::Patient;

pub const SEPARATOR: char = '|';
pub const N_FIELDS: usize = 7;

/// Render `p` as a single line, without a line terminator.
pub fn encode(p: &Patient) -> String {
    let id = p.id.to_string();
    let age = p.age.to_string();
    let gender = p.gender.to_string();
    let fields: [&str; N_FIELDS] = [
        &id, &p.name, &age, &gender, &p.address, &p.contact, &p.diagnosis,
    ];
    let mut sep = [0u8; 4];
    fields.join(SEPARATOR.encode_utf8(&mut sep))
}

/// Parse a single line (a trailing line terminator is tolerated).
pub fn decode(line: &str) -> Result<Patient> {
    let line = line.trim_end_matches(|c: char| c == '\n' || c == '\r');
    from_fields(line.split(SEPARATOR))
}

/// Parse one row produced by a `|`-delimited `csv::Reader`.
pub fn from_record(row: &csv::StringRecord) -> Result<Patient> {
    log::trace!("codec::from_record( {:?} ) called.", row);

    let line = row.position().map(|p| p.line()).unwrap_or(0);
    from_fields(row.iter()).map_err(|e| e.at_line(line))
}

fn from_fields<'a, I>(fields: I) -> Result<Patient>
where
    I: Iterator<Item = &'a str>
{
    let fields: Vec<&str> = fields.collect();
    if fields.len() != N_FIELDS {
        return Err(Error::format(format!(
            "expected {} fields, found {}", N_FIELDS, fields.len()
        )));
    }

    let id: u32 = fields[0].parse()
        .map_err(|e| Error::format(format!("id {:?}: {}", fields[0], &e)))?;
    let age: u8 = fields[2].parse()
        .map_err(|e| Error::format(format!("age {:?}: {}", fields[2], &e)))?;

    let mut gender_chars = fields[3].chars();
    let gender = match (gender_chars.next(), gender_chars.next()) {
        (Some(c), None) => c,
        _ => {
            return Err(Error::format(format!(
                "gender {:?} is not a single character", fields[3]
            )));
        },
    };

    Ok(Patient {
        id,
        name: fields[1].to_owned(),
        age,
        gender,
        address: fields[4].to_owned(),
        contact: fields[5].to_owned(),
        diagnosis: fields[6].to_owned(),
    })
}
