//! Binary population file
//!
//! Big-endian, no padding:
//!
//! ```text
//! u32 family_count
//! family_count x { u16 zone, u16 department, u16 province }            6 bytes
//! u32 person_count
//! person_count x { u32 family, u8 age, u8 female, u32 school, u32 employed }  14 bytes
//! ```

use std::io::{Read, Write};

use super::records::{FamilyRecord, Person};
use crate::core::error::{Result, SynthError};
use crate::core::types::{FamilyId, SchoolId, Sex};

pub const FAMILY_RECORD_LEN: usize = 6;
pub const PERSON_RECORD_LEN: usize = 14;

/// Contents of a population file
#[derive(Debug, Clone, PartialEq)]
pub struct PopulationFile {
    pub families: Vec<FamilyRecord>,
    pub persons: Vec<Person>,
}

fn count_field(field: &'static str, len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| SynthError::FieldOverflow {
        field,
        value: len as u64,
    })
}

pub fn encode_family(record: &FamilyRecord) -> [u8; FAMILY_RECORD_LEN] {
    let mut buf = [0u8; FAMILY_RECORD_LEN];
    buf[0..2].copy_from_slice(&record.zone.to_be_bytes());
    buf[2..4].copy_from_slice(&record.department.to_be_bytes());
    buf[4..6].copy_from_slice(&record.province.to_be_bytes());
    buf
}

pub fn encode_person(person: &Person) -> [u8; PERSON_RECORD_LEN] {
    let mut buf = [0u8; PERSON_RECORD_LEN];
    buf[0..4].copy_from_slice(&person.family.0.to_be_bytes());
    buf[4] = person.age;
    buf[5] = person.sex.is_female() as u8;
    buf[6..10].copy_from_slice(&person.school.0.to_be_bytes());
    buf[10..14].copy_from_slice(&(person.employed as u32).to_be_bytes());
    buf
}

fn decode_family(buf: &[u8; FAMILY_RECORD_LEN]) -> FamilyRecord {
    FamilyRecord {
        zone: u16::from_be_bytes([buf[0], buf[1]]),
        department: u16::from_be_bytes([buf[2], buf[3]]),
        province: u16::from_be_bytes([buf[4], buf[5]]),
    }
}

fn decode_person(index: usize, buf: &[u8; PERSON_RECORD_LEN]) -> Result<Person> {
    let sex = match buf[5] {
        1 => Sex::Female,
        0 => Sex::Male,
        other => {
            return Err(SynthError::MalformedRecord(format!(
                "person {} has sex byte {}",
                index, other
            )))
        }
    };
    let employed = match u32::from_be_bytes([buf[10], buf[11], buf[12], buf[13]]) {
        0 => false,
        1 => true,
        other => {
            return Err(SynthError::MalformedRecord(format!(
                "person {} has employment value {}",
                index, other
            )))
        }
    };
    Ok(Person {
        family: FamilyId(u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]])),
        age: buf[4],
        sex,
        school: SchoolId(u32::from_be_bytes([buf[6], buf[7], buf[8], buf[9]])),
        employed,
    })
}

/// Write the family list then the person list
pub fn write_population<W: Write>(out: &mut W, families: &[FamilyRecord], persons: &[Person]) -> Result<()> {
    out.write_all(&count_field("family count", families.len())?.to_be_bytes())?;
    for family in families {
        out.write_all(&encode_family(family))?;
    }
    out.write_all(&count_field("person count", persons.len())?.to_be_bytes())?;
    for person in persons {
        out.write_all(&encode_person(person))?;
    }
    Ok(())
}

fn read_exact_or<R: Read>(input: &mut R, buf: &mut [u8], what: &str) -> Result<()> {
    input.read_exact(buf).map_err(|e| match e.kind() {
        std::io::ErrorKind::UnexpectedEof => SynthError::MalformedRecord(format!("truncated while reading {}", what)),
        _ => SynthError::IoError(e),
    })
}

fn read_count<R: Read>(input: &mut R, what: &str) -> Result<u32> {
    let mut buf = [0u8; 4];
    read_exact_or(input, &mut buf, what)?;
    Ok(u32::from_be_bytes(buf))
}

/// Read a population file, rejecting truncation and trailing bytes
pub fn read_population<R: Read>(input: &mut R) -> Result<PopulationFile> {
    let family_count = read_count(input, "family count")? as usize;
    let mut families = Vec::with_capacity(family_count.min(1 << 20));
    let mut fbuf = [0u8; FAMILY_RECORD_LEN];
    for i in 0..family_count {
        read_exact_or(input, &mut fbuf, &format!("family {}", i))?;
        families.push(decode_family(&fbuf));
    }

    let person_count = read_count(input, "person count")? as usize;
    let mut persons = Vec::with_capacity(person_count.min(1 << 20));
    let mut pbuf = [0u8; PERSON_RECORD_LEN];
    for i in 0..person_count {
        read_exact_or(input, &mut pbuf, &format!("person {}", i))?;
        persons.push(decode_person(i, &pbuf)?);
    }

    let mut rest = [0u8; 1];
    if input.read(&mut rest)? != 0 {
        return Err(SynthError::MalformedRecord("trailing bytes after person list".into()));
    }
    Ok(PopulationFile { families, persons })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person(family: u32, age: u8, sex: Sex, school: u32, employed: bool) -> Person {
        Person {
            family: FamilyId(family),
            age,
            sex,
            school: SchoolId(school),
            employed,
        }
    }

    #[test]
    fn test_person_layout() {
        let bytes = encode_person(&person(0x01020304, 35, Sex::Female, 0x0A0B0C0D, true));
        assert_eq!(bytes, [1, 2, 3, 4, 35, 1, 0x0A, 0x0B, 0x0C, 0x0D, 0, 0, 0, 1]);
    }

    #[test]
    fn test_family_layout() {
        let bytes = encode_family(&FamilyRecord {
            zone: 0x0102,
            department: 3,
            province: 0xFFFF,
        });
        assert_eq!(bytes, [1, 2, 0, 3, 0xFF, 0xFF]);
    }

    #[test]
    fn test_file_layout_and_read_back() {
        let families = vec![FamilyRecord { zone: 1, department: 0, province: 0 }];
        let persons = vec![person(0, 7, Sex::Male, 3, false), person(0, 44, Sex::Female, 0, true)];
        let mut buf = Vec::new();
        write_population(&mut buf, &families, &persons).unwrap();
        assert_eq!(buf.len(), 4 + FAMILY_RECORD_LEN + 4 + 2 * PERSON_RECORD_LEN);
        assert_eq!(&buf[0..4], &[0, 0, 0, 1]);
        assert_eq!(&buf[10..14], &[0, 0, 0, 2]);

        let decoded = read_population(&mut buf.as_slice()).unwrap();
        assert_eq!(decoded.families, families);
        assert_eq!(decoded.persons, persons);
    }

    #[test]
    fn test_truncated_input_rejected() {
        let mut buf = Vec::new();
        write_population(&mut buf, &[], &[person(0, 1, Sex::Male, 0, false)]).unwrap();
        buf.pop();
        assert!(matches!(
            read_population(&mut buf.as_slice()),
            Err(SynthError::MalformedRecord(_))
        ));
    }

    #[test]
    fn test_bad_sex_byte_rejected() {
        let mut buf = Vec::new();
        write_population(&mut buf, &[], &[person(0, 1, Sex::Male, 0, false)]).unwrap();
        buf[4 + 4 + 5] = 7;
        assert!(read_population(&mut buf.as_slice()).is_err());
    }
}
