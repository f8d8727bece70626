#[cfg(test)]
mod fakes;
#[cfg(test)]
mod probe;
