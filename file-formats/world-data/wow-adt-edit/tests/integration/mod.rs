mod editing;
mod relocation;
mod round_trip;
mod source;
