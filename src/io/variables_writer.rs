use std::io::Write;

use crate::engine::RsaEngine;

/// Writes the solver-facing variable table as CSV, one line per variable plus
/// a header.
pub fn write_variables_csv<W: Write>(engine: &RsaEngine, mut writer: W) -> Result<(), std::io::Error> {
    writeln!(
        writer,
        "var_id,demand,link,slice,length,length_with_penalty,coefficient"
    )?;
    for v in engine.variables() {
        writeln!(
            writer,
            "{},{},{},{},{},{},{}",
            v.var_id, v.demand, v.link, v.slice, v.length, v.length_with_penalty, v.coefficient
        )?;
    }
    Ok(())
}

/// Writes the same table as JSON lines, one record per variable.
pub fn write_variables_json<W: Write>(engine: &RsaEngine, mut writer: W) -> Result<(), std::io::Error> {
    for v in engine.variables() {
        serde_json::to_writer(&mut writer, &v)?;
        writeln!(writer)?;
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        engine::RsaEngine,
        instance::Input,
        testing::{ring_instance, unit_demand},
    };

    fn small_engine() -> RsaEngine {
        let instance = ring_instance(4, 2, vec![unit_demand(0, 0, 2, 3.0)], Input::default());
        RsaEngine::new(&instance)
    }

    #[test]
    fn csv_has_one_line_per_variable() {
        let engine = small_engine();
        let mut buffer: Vec<u8> = Vec::new();
        write_variables_csv(&engine, &mut buffer).unwrap();

        let output = String::from_utf8(buffer).unwrap();
        let mut lines = output.lines();
        assert_eq!(
            lines.next().unwrap(),
            "var_id,demand,link,slice,length,length_with_penalty,coefficient"
        );
        assert_eq!(lines.count(), engine.number_of_variables() as usize);
    }

    #[test]
    fn json_records_round_trip() {
        let engine = small_engine();
        let mut buffer: Vec<u8> = Vec::new();
        write_variables_json(&engine, &mut buffer).unwrap();

        let output = String::from_utf8(buffer).unwrap();
        for (i, line) in output.lines().enumerate() {
            let record: serde_json::Value = serde_json::from_str(line).unwrap();
            assert_eq!(record["var_id"], i as u64);
            assert!(record["link"].is_u64());
        }
        assert_eq!(
            output.lines().count(),
            engine.number_of_variables() as usize
        );
    }
}
