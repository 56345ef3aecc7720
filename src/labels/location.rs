use std::fmt::Display;

use log::trace;

/// Width of one allocation slot in bytes.
pub const WORD_SIZE: u32 = 8;

/// Storage class of a location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    Global,
    Function,
    Const,
    String,
}

impl Region {
    pub const ALL: [Region; 4] = [Region::Global, Region::Function, Region::Const, Region::String];

    fn index(&self) -> usize {
        match self {
            Region::Global => 0,
            Region::Function => 1,
            Region::Const => 2,
            Region::String => 3,
        }
    }
}

impl Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Region::Global => write!(f, "global"),
            Region::Function => write!(f, "local"),
            Region::Const => write!(f, "const"),
            Region::String => write!(f, "string"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Location {
    pub region: Region,
    pub offset: u32,
}

impl Location {
    pub fn new(region: Region, offset: u32) -> Self {
        Location { region, offset }
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.region, self.offset)
    }
}

/// Bump allocators for the four regions of one compilation.
///
/// Offsets only grow and are never handed out twice.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegionCounters {
    next: [u32; 4],
    allocated: [u32; 4],
}

impl RegionCounters {
    pub fn new() -> Self {
        RegionCounters::default()
    }

    pub fn allocate(&mut self, region: Region) -> Location {
        let index = region.index();
        let location = Location::new(region, self.next[index]);
        self.next[index] += WORD_SIZE;
        self.allocated[index] += 1;
        trace!("allocated {}", location);
        location
    }

    /// Number of locations handed out in `region`.
    pub fn allocated(&self, region: Region) -> u32 {
        self.allocated[region.index()]
    }

    pub fn total_allocated(&self) -> u32 {
        self.allocated.iter().sum()
    }

    /// Bytes reserved so far in `region`.
    pub fn size(&self, region: Region) -> u32 {
        self.next[region.index()]
    }
}
