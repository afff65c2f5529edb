//! BIFF8 built-in function table.
//!
//! Maps upper-case function names to their index in Excel's function table,
//! argument count bounds and operand classes. Functions added after Excel
//! 2003 are absent and cannot be written to an XLS file.

use phf::phf_map;

/// Operand class a function returns or expects from an argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgClass {
    Reference,
    Value,
    Array,
}

use ArgClass::{Array as A, Reference as R, Value as V};

#[derive(Debug, Clone, Copy)]
pub struct FunctionInfo {
    /// Index in the BIFF8 function table (iftab)
    pub index: u16,
    pub min_args: u8,
    pub max_args: u8,
    pub ret: ArgClass,
    /// Classes of the leading parameters; the last one repeats
    pub params: &'static [ArgClass],
}

impl FunctionInfo {
    /// Functions with a fixed argument count are written as PtgFunc.
    pub fn is_fixed(&self) -> bool {
        self.min_args == self.max_args
    }

    pub fn param_class(&self, position: usize) -> ArgClass {
        self.params
            .get(position)
            .or_else(|| self.params.last())
            .copied()
            .unwrap_or(ArgClass::Value)
    }
}

macro_rules! f {
    ($index:expr, $min:expr, $max:expr, $ret:expr, [$($p:expr),*]) => {
        FunctionInfo {
            index: $index,
            min_args: $min,
            max_args: $max,
            ret: $ret,
            params: &[$($p),*],
        }
    };
}

pub static FUNCTIONS: phf::Map<&'static str, FunctionInfo> = phf_map! {
    "COUNT" => f!(0, 0, 30, V, [R]),
    "IF" => f!(1, 2, 3, R, [V, R, R]),
    "ISNA" => f!(2, 1, 1, V, [V]),
    "ISERROR" => f!(3, 1, 1, V, [V]),
    "SUM" => f!(4, 0, 30, V, [R]),
    "AVERAGE" => f!(5, 1, 30, V, [R]),
    "MIN" => f!(6, 1, 30, V, [R]),
    "MAX" => f!(7, 1, 30, V, [R]),
    "ROW" => f!(8, 0, 1, V, [R]),
    "COLUMN" => f!(9, 0, 1, V, [R]),
    "NA" => f!(10, 0, 0, V, []),
    "NPV" => f!(11, 2, 30, V, [V, R]),
    "STDEV" => f!(12, 1, 30, V, [R]),
    "DOLLAR" => f!(13, 1, 2, V, [V]),
    "FIXED" => f!(14, 1, 3, V, [V]),
    "SIN" => f!(15, 1, 1, V, [V]),
    "COS" => f!(16, 1, 1, V, [V]),
    "TAN" => f!(17, 1, 1, V, [V]),
    "ATAN" => f!(18, 1, 1, V, [V]),
    "PI" => f!(19, 0, 0, V, []),
    "SQRT" => f!(20, 1, 1, V, [V]),
    "EXP" => f!(21, 1, 1, V, [V]),
    "LN" => f!(22, 1, 1, V, [V]),
    "LOG10" => f!(23, 1, 1, V, [V]),
    "ABS" => f!(24, 1, 1, V, [V]),
    "INT" => f!(25, 1, 1, V, [V]),
    "SIGN" => f!(26, 1, 1, V, [V]),
    "ROUND" => f!(27, 2, 2, V, [V]),
    "LOOKUP" => f!(28, 2, 3, V, [V, R]),
    "INDEX" => f!(29, 2, 4, R, [R, V]),
    "REPT" => f!(30, 2, 2, V, [V]),
    "MID" => f!(31, 3, 3, V, [V]),
    "LEN" => f!(32, 1, 1, V, [V]),
    "VALUE" => f!(33, 1, 1, V, [V]),
    "TRUE" => f!(34, 0, 0, V, []),
    "FALSE" => f!(35, 0, 0, V, []),
    "AND" => f!(36, 1, 30, V, [R]),
    "OR" => f!(37, 1, 30, V, [R]),
    "NOT" => f!(38, 1, 1, V, [V]),
    "MOD" => f!(39, 2, 2, V, [V]),
    "DCOUNT" => f!(40, 3, 3, V, [R]),
    "DSUM" => f!(41, 3, 3, V, [R]),
    "DAVERAGE" => f!(42, 3, 3, V, [R]),
    "DMIN" => f!(43, 3, 3, V, [R]),
    "DMAX" => f!(44, 3, 3, V, [R]),
    "DSTDEV" => f!(45, 3, 3, V, [R]),
    "VAR" => f!(46, 1, 30, V, [R]),
    "DVAR" => f!(47, 3, 3, V, [R]),
    "TEXT" => f!(48, 2, 2, V, [V]),
    "LINEST" => f!(49, 1, 4, A, [R, R, V, V]),
    "TREND" => f!(50, 1, 4, A, [R, R, R, V]),
    "LOGEST" => f!(51, 1, 4, A, [R, R, V, V]),
    "GROWTH" => f!(52, 1, 4, A, [R, R, R, V]),
    "PV" => f!(56, 3, 5, V, [V]),
    "FV" => f!(57, 3, 5, V, [V]),
    "NPER" => f!(58, 3, 5, V, [V]),
    "PMT" => f!(59, 3, 5, V, [V]),
    "RATE" => f!(60, 3, 6, V, [V]),
    "MIRR" => f!(61, 3, 3, V, [R, V]),
    "IRR" => f!(62, 1, 2, V, [R, V]),
    "RAND" => f!(63, 0, 0, V, []),
    "MATCH" => f!(64, 2, 3, V, [V, R, R]),
    "DATE" => f!(65, 3, 3, V, [V]),
    "TIME" => f!(66, 3, 3, V, [V]),
    "DAY" => f!(67, 1, 1, V, [V]),
    "MONTH" => f!(68, 1, 1, V, [V]),
    "YEAR" => f!(69, 1, 1, V, [V]),
    "WEEKDAY" => f!(70, 1, 2, V, [V]),
    "HOUR" => f!(71, 1, 1, V, [V]),
    "MINUTE" => f!(72, 1, 1, V, [V]),
    "SECOND" => f!(73, 1, 1, V, [V]),
    "NOW" => f!(74, 0, 0, V, []),
    "AREAS" => f!(75, 1, 1, V, [R]),
    "ROWS" => f!(76, 1, 1, V, [R]),
    "COLUMNS" => f!(77, 1, 1, V, [R]),
    "OFFSET" => f!(78, 3, 5, R, [R, V]),
    "SEARCH" => f!(82, 2, 3, V, [V]),
    "TRANSPOSE" => f!(83, 1, 1, A, [A]),
    "TYPE" => f!(86, 1, 1, V, [V]),
    "ATAN2" => f!(97, 2, 2, V, [V]),
    "ASIN" => f!(98, 1, 1, V, [V]),
    "ACOS" => f!(99, 1, 1, V, [V]),
    "CHOOSE" => f!(100, 2, 30, R, [V, R]),
    "HLOOKUP" => f!(101, 3, 4, V, [V, R, R, V]),
    "VLOOKUP" => f!(102, 3, 4, V, [V, R, R, V]),
    "ISREF" => f!(105, 1, 1, V, [R]),
    "LOG" => f!(109, 1, 2, V, [V]),
    "CHAR" => f!(111, 1, 1, V, [V]),
    "LOWER" => f!(112, 1, 1, V, [V]),
    "UPPER" => f!(113, 1, 1, V, [V]),
    "PROPER" => f!(114, 1, 1, V, [V]),
    "LEFT" => f!(115, 1, 2, V, [V]),
    "RIGHT" => f!(116, 1, 2, V, [V]),
    "EXACT" => f!(117, 2, 2, V, [V]),
    "TRIM" => f!(118, 1, 1, V, [V]),
    "REPLACE" => f!(119, 4, 4, V, [V]),
    "SUBSTITUTE" => f!(120, 3, 4, V, [V]),
    "CODE" => f!(121, 1, 1, V, [V]),
    "FIND" => f!(124, 2, 3, V, [V]),
    "CELL" => f!(125, 1, 2, V, [V, R]),
    "ISERR" => f!(126, 1, 1, V, [V]),
    "ISTEXT" => f!(127, 1, 1, V, [V]),
    "ISNUMBER" => f!(128, 1, 1, V, [V]),
    "ISBLANK" => f!(129, 1, 1, V, [V]),
    "T" => f!(130, 1, 1, V, [R]),
    "N" => f!(131, 1, 1, V, [R]),
    "DATEVALUE" => f!(140, 1, 1, V, [V]),
    "TIMEVALUE" => f!(141, 1, 1, V, [V]),
    "SLN" => f!(142, 3, 3, V, [V]),
    "SYD" => f!(143, 4, 4, V, [V]),
    "DDB" => f!(144, 4, 5, V, [V]),
    "INDIRECT" => f!(148, 1, 2, R, [V]),
    "CLEAN" => f!(162, 1, 1, V, [V]),
    "MDETERM" => f!(163, 1, 1, V, [A]),
    "MINVERSE" => f!(164, 1, 1, A, [A]),
    "MMULT" => f!(165, 2, 2, A, [A]),
    "IPMT" => f!(167, 4, 6, V, [V]),
    "PPMT" => f!(168, 4, 6, V, [V]),
    "COUNTA" => f!(169, 0, 30, V, [R]),
    "PRODUCT" => f!(183, 0, 30, V, [R]),
    "FACT" => f!(184, 1, 1, V, [V]),
    "DPRODUCT" => f!(189, 3, 3, V, [R]),
    "ISNONTEXT" => f!(190, 1, 1, V, [V]),
    "STDEVP" => f!(193, 1, 30, V, [R]),
    "VARP" => f!(194, 1, 30, V, [R]),
    "DSTDEVP" => f!(195, 3, 3, V, [R]),
    "DVARP" => f!(196, 3, 3, V, [R]),
    "TRUNC" => f!(197, 1, 2, V, [V]),
    "ISLOGICAL" => f!(198, 1, 1, V, [V]),
    "DCOUNTA" => f!(199, 3, 3, V, [R]),
    "USDOLLAR" => f!(204, 1, 2, V, [V]),
    "FINDB" => f!(205, 2, 3, V, [V]),
    "SEARCHB" => f!(206, 2, 3, V, [V]),
    "REPLACEB" => f!(207, 4, 4, V, [V]),
    "LEFTB" => f!(208, 1, 2, V, [V]),
    "RIGHTB" => f!(209, 1, 2, V, [V]),
    "MIDB" => f!(210, 3, 3, V, [V]),
    "LENB" => f!(211, 1, 1, V, [V]),
    "ROUNDUP" => f!(212, 2, 2, V, [V]),
    "ROUNDDOWN" => f!(213, 2, 2, V, [V]),
    "ASC" => f!(214, 1, 1, V, [V]),
    "DBCS" => f!(215, 1, 1, V, [V]),
    "RANK" => f!(216, 2, 3, V, [V, R, V]),
    "ADDRESS" => f!(219, 2, 5, V, [V]),
    "DAYS360" => f!(220, 2, 3, V, [V]),
    "TODAY" => f!(221, 0, 0, V, []),
    "VDB" => f!(222, 5, 7, V, [V]),
    "MEDIAN" => f!(227, 1, 30, V, [R]),
    "SUMPRODUCT" => f!(228, 1, 30, V, [A]),
    "SINH" => f!(229, 1, 1, V, [V]),
    "COSH" => f!(230, 1, 1, V, [V]),
    "TANH" => f!(231, 1, 1, V, [V]),
    "ASINH" => f!(232, 1, 1, V, [V]),
    "ACOSH" => f!(233, 1, 1, V, [V]),
    "ATANH" => f!(234, 1, 1, V, [V]),
    "DGET" => f!(235, 3, 3, V, [R]),
    "INFO" => f!(244, 1, 1, V, [V]),
    "DB" => f!(247, 4, 5, V, [V]),
    "FREQUENCY" => f!(252, 2, 2, A, [R]),
    "ERROR.TYPE" => f!(261, 1, 1, V, [V]),
    "AVEDEV" => f!(269, 1, 30, V, [R]),
    "BETADIST" => f!(270, 3, 5, V, [V]),
    "GAMMALN" => f!(271, 1, 1, V, [V]),
    "BETAINV" => f!(272, 3, 5, V, [V]),
    "BINOMDIST" => f!(273, 4, 4, V, [V]),
    "CHIDIST" => f!(274, 2, 2, V, [V]),
    "CHIINV" => f!(275, 2, 2, V, [V]),
    "COMBIN" => f!(276, 2, 2, V, [V]),
    "CONFIDENCE" => f!(277, 3, 3, V, [V]),
    "CRITBINOM" => f!(278, 3, 3, V, [V]),
    "EVEN" => f!(279, 1, 1, V, [V]),
    "EXPONDIST" => f!(280, 3, 3, V, [V]),
    "FDIST" => f!(281, 3, 3, V, [V]),
    "FINV" => f!(282, 3, 3, V, [V]),
    "FISHER" => f!(283, 1, 1, V, [V]),
    "FISHERINV" => f!(284, 1, 1, V, [V]),
    "FLOOR" => f!(285, 2, 2, V, [V]),
    "GAMMADIST" => f!(286, 4, 4, V, [V]),
    "GAMMAINV" => f!(287, 3, 3, V, [V]),
    "CEILING" => f!(288, 2, 2, V, [V]),
    "HYPGEOMDIST" => f!(289, 4, 4, V, [V]),
    "LOGNORMDIST" => f!(290, 3, 3, V, [V]),
    "LOGINV" => f!(291, 3, 3, V, [V]),
    "NEGBINOMDIST" => f!(292, 3, 3, V, [V]),
    "NORMDIST" => f!(293, 4, 4, V, [V]),
    "NORMSDIST" => f!(294, 1, 1, V, [V]),
    "NORMINV" => f!(295, 3, 3, V, [V]),
    "NORMSINV" => f!(296, 1, 1, V, [V]),
    "STANDARDIZE" => f!(297, 3, 3, V, [V]),
    "ODD" => f!(298, 1, 1, V, [V]),
    "PERMUT" => f!(299, 2, 2, V, [V]),
    "POISSON" => f!(300, 3, 3, V, [V]),
    "TDIST" => f!(301, 3, 3, V, [V]),
    "WEIBULL" => f!(302, 4, 4, V, [V]),
    "SUMXMY2" => f!(303, 2, 2, V, [A]),
    "SUMX2MY2" => f!(304, 2, 2, V, [A]),
    "SUMX2PY2" => f!(305, 2, 2, V, [A]),
    "CHITEST" => f!(306, 2, 2, V, [A]),
    "CORREL" => f!(307, 2, 2, V, [A]),
    "COVAR" => f!(308, 2, 2, V, [A]),
    "FORECAST" => f!(309, 3, 3, V, [V, A]),
    "FTEST" => f!(310, 2, 2, V, [A]),
    "INTERCEPT" => f!(311, 2, 2, V, [A]),
    "PEARSON" => f!(312, 2, 2, V, [A]),
    "RSQ" => f!(313, 2, 2, V, [A]),
    "STEYX" => f!(314, 2, 2, V, [A]),
    "SLOPE" => f!(315, 2, 2, V, [A]),
    "TTEST" => f!(316, 4, 4, V, [A, A, V]),
    "PROB" => f!(317, 3, 4, V, [A, A, V]),
    "DEVSQ" => f!(318, 1, 30, V, [R]),
    "GEOMEAN" => f!(319, 1, 30, V, [R]),
    "HARMEAN" => f!(320, 1, 30, V, [R]),
    "SUMSQ" => f!(321, 0, 30, V, [R]),
    "KURT" => f!(322, 1, 30, V, [R]),
    "SKEW" => f!(323, 1, 30, V, [R]),
    "ZTEST" => f!(324, 2, 3, V, [R, V]),
    "LARGE" => f!(325, 2, 2, V, [R, V]),
    "SMALL" => f!(326, 2, 2, V, [R, V]),
    "QUARTILE" => f!(327, 2, 2, V, [R, V]),
    "PERCENTILE" => f!(328, 2, 2, V, [R, V]),
    "PERCENTRANK" => f!(329, 2, 3, V, [R, V]),
    "MODE" => f!(330, 1, 30, V, [A]),
    "TRIMMEAN" => f!(331, 2, 2, V, [R, V]),
    "TINV" => f!(332, 2, 2, V, [V]),
    "CONCATENATE" => f!(336, 0, 30, V, [V]),
    "POWER" => f!(337, 2, 2, V, [V]),
    "RADIANS" => f!(342, 1, 1, V, [V]),
    "DEGREES" => f!(343, 1, 1, V, [V]),
    "SUBTOTAL" => f!(344, 2, 30, V, [V, R]),
    "SUMIF" => f!(345, 2, 3, V, [R, V, R]),
    "COUNTIF" => f!(346, 2, 2, V, [R, V]),
    "COUNTBLANK" => f!(347, 1, 1, V, [R]),
    "ISPMT" => f!(350, 4, 4, V, [V]),
    "DATEDIF" => f!(351, 3, 3, V, [V]),
    "ROMAN" => f!(354, 1, 2, V, [V]),
    "HYPERLINK" => f!(359, 1, 2, V, [V]),
    "PHONETIC" => f!(360, 1, 1, V, [R]),
    "AVERAGEA" => f!(361, 1, 30, V, [R]),
    "MAXA" => f!(362, 1, 30, V, [R]),
    "MINA" => f!(363, 1, 30, V, [R]),
    "STDEVPA" => f!(364, 1, 30, V, [R]),
    "VARPA" => f!(365, 1, 30, V, [R]),
    "STDEVA" => f!(366, 1, 30, V, [R]),
    "VARA" => f!(367, 1, 30, V, [R]),
};

/// Look up a function by name, ignoring case.
pub fn lookup(name: &str) -> Option<&'static FunctionInfo> {
    FUNCTIONS.get(name.to_ascii_uppercase().as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let sum = lookup("sum").unwrap();
        assert_eq!(sum.index, 4);
        assert!(!sum.is_fixed());
        assert_eq!(lookup("Vlookup").unwrap().index, 102);
        assert!(lookup("XLOOKUP").is_none());
        assert!(lookup("_xlfn.CONCAT").is_none());
    }

    #[test]
    fn test_param_class_repeats_last() {
        let vlookup = lookup("VLOOKUP").unwrap();
        assert_eq!(vlookup.param_class(0), ArgClass::Value);
        assert_eq!(vlookup.param_class(1), ArgClass::Reference);
        let sum = lookup("SUM").unwrap();
        assert_eq!(sum.param_class(12), ArgClass::Reference);
        let pi = lookup("PI").unwrap();
        assert!(pi.is_fixed());
        assert_eq!(pi.param_class(0), ArgClass::Value);
    }

    #[test]
    fn test_table_size() {
        assert!(FUNCTIONS.len() >= 180);
    }
}
