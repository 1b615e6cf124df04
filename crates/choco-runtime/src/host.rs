//! Host functions imported by compiled modules

use crate::error::Trap;

/// Receives program output
pub trait Host {
    fn write_line(&mut self, line: &str);
}

/// Prints to standard output
#[derive(Debug, Default)]
pub struct StdoutHost;

impl Host for StdoutHost {
    fn write_line(&mut self, line: &str) {
        println!("{}", line);
    }
}

/// Collects output lines in memory
#[derive(Debug, Default, Clone)]
pub struct CapturingHost {
    lines: Vec<String>,
}

impl CapturingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}

impl Host for CapturingHost {
    fn write_line(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }
}

/// The functions a module may import, by field name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostFunction {
    PrintNum,
    PrintBool,
    PrintNone,
    Abs,
    Min,
    Max,
    Pow,
    CheckInit,
}

impl HostFunction {
    pub fn from_field(field: &str) -> Option<Self> {
        let function = match field {
            "print_num" => HostFunction::PrintNum,
            "print_bool" => HostFunction::PrintBool,
            "print_none" => HostFunction::PrintNone,
            "abs" => HostFunction::Abs,
            "min" => HostFunction::Min,
            "max" => HostFunction::Max,
            "pow" => HostFunction::Pow,
            "check_init" => HostFunction::CheckInit,
            _ => return None,
        };
        Some(function)
    }

    pub fn params(self) -> usize {
        match self {
            HostFunction::Min | HostFunction::Max | HostFunction::Pow => 2,
            _ => 1,
        }
    }

    pub fn has_result(self) -> bool {
        !matches!(
            self,
            HostFunction::PrintNum | HostFunction::PrintBool | HostFunction::PrintNone
        )
    }

    fn name(self) -> &'static str {
        match self {
            HostFunction::PrintNum => "print_num",
            HostFunction::PrintBool => "print_bool",
            HostFunction::PrintNone => "print_none",
            HostFunction::Abs => "abs",
            HostFunction::Min => "min",
            HostFunction::Max => "max",
            HostFunction::Pow => "pow",
            HostFunction::CheckInit => "check_init",
        }
    }

    /// Run the function. `args` has exactly [`params`](Self::params) words.
    pub fn call(self, host: &mut dyn Host, args: &[i32]) -> Result<Option<i32>, Trap> {
        let arg = |i: usize| args.get(i).copied().ok_or(Trap::StackUnderflow);
        match self {
            HostFunction::PrintNum => {
                host.write_line(&arg(0)?.to_string());
                Ok(None)
            }
            HostFunction::PrintBool => {
                host.write_line(if arg(0)? != 0 { "True" } else { "False" });
                Ok(None)
            }
            HostFunction::PrintNone => {
                host.write_line("None");
                Ok(None)
            }
            HostFunction::Abs => Ok(Some(arg(0)?.wrapping_abs())),
            HostFunction::Min => Ok(Some(arg(0)?.min(arg(1)?))),
            HostFunction::Max => Ok(Some(arg(0)?.max(arg(1)?))),
            HostFunction::Pow => {
                let (base, exp) = (arg(0)?, arg(1)?);
                if exp < 0 {
                    return Err(Trap::InvalidArgument {
                        function: self.name().to_string(),
                        value: exp,
                    });
                }
                Ok(Some(base.wrapping_pow(exp as u32)))
            }
            HostFunction::CheckInit => {
                let address = arg(0)?;
                if address <= 0 {
                    return Err(Trap::ObjectNotInitialized);
                }
                Ok(Some(address))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prints() {
        let mut host = CapturingHost::new();
        HostFunction::PrintNum.call(&mut host, &[-12]).unwrap();
        HostFunction::PrintBool.call(&mut host, &[1]).unwrap();
        HostFunction::PrintBool.call(&mut host, &[0]).unwrap();
        HostFunction::PrintNone.call(&mut host, &[0]).unwrap();
        assert_eq!(host.lines(), ["-12", "True", "False", "None"]);
    }

    #[test]
    fn test_arithmetic() {
        let mut host = CapturingHost::new();
        assert_eq!(HostFunction::Abs.call(&mut host, &[-3]), Ok(Some(3)));
        assert_eq!(HostFunction::Min.call(&mut host, &[4, -1]), Ok(Some(-1)));
        assert_eq!(HostFunction::Max.call(&mut host, &[4, -1]), Ok(Some(4)));
        assert_eq!(HostFunction::Pow.call(&mut host, &[2, 10]), Ok(Some(1024)));
        assert_eq!(HostFunction::Pow.call(&mut host, &[5, 0]), Ok(Some(1)));
        assert!(matches!(
            HostFunction::Pow.call(&mut host, &[2, -1]),
            Err(Trap::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_check_init() {
        let mut host = CapturingHost::new();
        assert_eq!(HostFunction::CheckInit.call(&mut host, &[16]), Ok(Some(16)));
        assert_eq!(
            HostFunction::CheckInit.call(&mut host, &[0]),
            Err(Trap::ObjectNotInitialized)
        );
    }

    #[test]
    fn test_fields() {
        assert_eq!(HostFunction::from_field("pow"), Some(HostFunction::Pow));
        assert_eq!(HostFunction::from_field("print_str"), None);
        assert!(!HostFunction::PrintNum.has_result());
        assert_eq!(HostFunction::Max.params(), 2);
    }
}
