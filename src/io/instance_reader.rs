use std::{
    fs::File,
    io::{BufRead, BufReader, ErrorKind, Lines},
    path::Path,
};

use crate::{
    graph::{LinkLabel, NumNodes},
    instance::{Demand, DemandId, Fiber},
};

pub type Result<T> = std::io::Result<T>;

macro_rules! raise_error_unless {
    ($cond : expr, $kind : expr, $info : expr) => {
        if !($cond) {
            return Err(std::io::Error::new($kind, $info));
        }
    };
}

macro_rules! parse_next_value {
    ($iterator : expr, $name : expr) => {{
        let next = $iterator.next();
        raise_error_unless!(
            next.is_some(),
            ErrorKind::InvalidData,
            format!("Premature end of line when parsing {}.", $name)
        );

        let parsed = next.unwrap().parse();
        raise_error_unless!(
            parsed.is_ok(),
            ErrorKind::InvalidData,
            format!("Invalid value found. Cannot parse {}.", $name)
        );

        parsed.unwrap()
    }};
}

/// Line-oriented reader shared by the topology and demand formats: lines
/// starting with `c` are comments, the first other line is a
/// `p <type> <count...>` header, every following line is one record.
struct RecordReader<R> {
    lines: Lines<R>,
}

impl<R: BufRead> RecordReader<R> {
    fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
        }
    }

    fn next_non_comment_line(&mut self) -> Result<Option<String>> {
        loop {
            match self.lines.next() {
                None => return Ok(None),
                Some(Err(x)) => return Err(x),
                Some(Ok(line)) if line.starts_with('c') => continue,
                Some(Ok(line)) if line.trim().is_empty() => continue,
                Some(Ok(line)) => return Ok(Some(line)),
            }
        }
    }

    /// Parses a `p <file_type> <count...>` header into `counts`.
    fn parse_header(&mut self, file_type: &str, counts: &mut [u32]) -> Result<()> {
        let line = self.next_non_comment_line()?;
        raise_error_unless!(line.is_some(), ErrorKind::InvalidData, "No header found");
        let line = line.unwrap();

        let mut parts = line.split(' ').filter(|t| !t.is_empty());

        raise_error_unless!(
            parts.next() == Some("p"),
            ErrorKind::InvalidData,
            "Invalid header found; line should start with p"
        );
        raise_error_unless!(
            parts.next() == Some(file_type),
            ErrorKind::InvalidData,
            format!("Invalid header found; file type should be {file_type:?}")
        );

        for slot in counts.iter_mut() {
            *slot = parse_next_value!(parts, "Header>Count");
        }

        raise_error_unless!(
            parts.next().is_none(),
            ErrorKind::InvalidData,
            "Invalid header found; expected end of line"
        );

        Ok(())
    }
}

/// Reads a topology: a `p eon <nodes> <links>` header followed by one
/// `<source> <target> <length> <slots>` line per link. Links are indexed in
/// file order.
pub fn read_topology<R: BufRead>(reader: R) -> Result<(NumNodes, Vec<Fiber>)> {
    let mut records = RecordReader::new(reader);
    let mut counts = [0; 2];
    records.parse_header("eon", &mut counts)?;
    let [number_of_nodes, number_of_links] = counts;

    let mut fibers = Vec::with_capacity(number_of_links as usize);
    while let Some(line) = records.next_non_comment_line()? {
        let mut parts = line.split(' ').filter(|t| !t.is_empty());
        let source = parse_next_value!(parts, "Link>Source node");
        let target = parse_next_value!(parts, "Link>Target node");
        let length = parse_next_value!(parts, "Link>Length");
        let slots = parse_next_value!(parts, "Link>Slot count");

        debug_assert!(source < number_of_nodes && target < number_of_nodes);
        fibers.push(Fiber::new(fibers.len() as LinkLabel, source, target, length, slots));
    }

    raise_error_unless!(
        fibers.len() == number_of_links as usize,
        ErrorKind::InvalidData,
        format!(
            "Expected {} links, found {}",
            number_of_links,
            fibers.len()
        )
    );

    Ok((number_of_nodes, fibers))
}

pub fn read_topology_file<P: AsRef<Path>>(path: P) -> Result<(NumNodes, Vec<Fiber>)> {
    read_topology(BufReader::new(File::open(path)?))
}

/// Reads a demand list: a `p demands <count>` header followed by one
/// `<source> <target> <load> <max_length>` line per demand. Ids are assigned
/// in file order.
pub fn read_demands<R: BufRead>(reader: R) -> Result<Vec<Demand>> {
    let mut records = RecordReader::new(reader);
    let mut counts = [0; 1];
    records.parse_header("demands", &mut counts)?;
    let [number_of_demands] = counts;

    let mut demands = Vec::with_capacity(number_of_demands as usize);
    while let Some(line) = records.next_non_comment_line()? {
        let mut parts = line.split(' ').filter(|t| !t.is_empty());
        let source = parse_next_value!(parts, "Demand>Source node");
        let target = parse_next_value!(parts, "Demand>Target node");
        let load = parse_next_value!(parts, "Demand>Load");
        let max_length = parse_next_value!(parts, "Demand>Max length");

        demands.push(Demand::new(demands.len() as DemandId, source, target, load, max_length));
    }

    raise_error_unless!(
        demands.len() == number_of_demands as usize,
        ErrorKind::InvalidData,
        format!(
            "Expected {} demands, found {}",
            number_of_demands,
            demands.len()
        )
    );

    Ok(demands)
}

pub fn read_demands_file<P: AsRef<Path>>(path: P) -> Result<Vec<Demand>> {
    read_demands(BufReader::new(File::open(path)?))
}
