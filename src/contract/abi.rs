//! Fixed ABI of the person-registry contract.

use alloy::sol;

sol! {
    /// Emitted whenever a person's info is stored.
    #[derive(Debug)]
    event PersonInfoUpdated(uint256 indexed personIndex, string newName, uint256 newAge);

    function getPersonInfo(uint256 _personIndex) external view returns (string, uint256);

    function getPersonsCount() external view returns (uint256);

    function setPersonInfo(string _name, uint256 _age) external;
}
